use chrono::{DateTime, Utc};
use nv_core::{Article, ArticleSource, Category};
use tracing::error;

struct SampleArticle {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    content: &'static str,
    url: &'static str,
    image: &'static str,
    published_at: &'static str,
    source_name: &'static str,
    source_url: &'static str,
    category: Category,
}

impl SampleArticle {
    fn to_article(&self) -> Option<Article> {
        let published_at = match self.published_at.parse::<DateTime<Utc>>() {
            Ok(t) => t,
            Err(e) => {
                error!("Bad timestamp on sample article {}: {}", self.id, e);
                return None;
            }
        };
        Some(Article {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            content: self.content.to_string(),
            url: self.url.to_string(),
            image: self.image.to_string(),
            published_at,
            source: ArticleSource {
                name: self.source_name.to_string(),
                url: self.source_url.to_string(),
            },
            category: self.category,
        })
    }
}

/// Articles served when the remote store has nothing, newest first.
pub fn sample_articles() -> Vec<Article> {
    SAMPLES.iter().filter_map(SampleArticle::to_article).collect()
}

pub fn find_sample(id: &str) -> Option<Article> {
    SAMPLES
        .iter()
        .find(|sample| sample.id == id)
        .and_then(SampleArticle::to_article)
}

const SAMPLES: &[SampleArticle] = &[
    SampleArticle {
        id: "1",
        title: "Apple Unveils Revolutionary AI Features for iOS 18",
        description: "The tech giant announced significant AI enhancements coming to iPhone and iPad in the next major software update.",
        content: "Apple has revealed its most ambitious AI strategy yet with iOS 18, introducing features that will transform how users interact with their devices. The update includes an enhanced Siri with deeper app integration, AI-powered photo editing tools, predictive text suggestions, and smart notification management. \"These features represent the biggest leap forward in iOS intelligence,\" said Apple CEO Tim Cook during the announcement. The company emphasized that all AI processing happens on-device, maintaining Apple's commitment to privacy. Developers will also gain access to new AI APIs, enabling a new generation of intelligent apps. The update is expected to roll out this fall for iPhone 12 and newer devices.",
        url: "https://example.com/apple-ai-features",
        image: "https://source.unsplash.com/random/800x600?apple",
        published_at: "2023-06-10T14:30:00Z",
        source_name: "Tech Insider",
        source_url: "https://example.com/tech-insider",
        category: Category::Technology,
    },
    SampleArticle {
        id: "2",
        title: "Global Markets Rise as Inflation Concerns Ease",
        description: "Stock markets worldwide showed gains as new economic data suggests inflation may be cooling.",
        content: "Global stock markets rallied on Thursday as fresh economic data indicated that inflation pressures might be easing in major economies. The S&P 500 rose 1.2%, while European indices gained an average of 0.8%. Asian markets also closed higher, with Japan's Nikkei up 1.5%. The positive market reaction came after the U.S. Labor Department reported that consumer prices increased less than expected in May, rising 3.1% from a year earlier—down from 3.4% in April. \"This is exactly what investors wanted to see,\" said Jane Smith, chief economist at Global Investments. \"It suggests the Fed's policy is working without pushing the economy into recession.\" Bond yields fell following the news, with the 10-year Treasury yield dropping to 3.8%. Economists now predict that central banks might begin cutting interest rates sooner than previously expected, possibly as early as September.",
        url: "https://example.com/markets-inflation",
        image: "https://source.unsplash.com/random/800x600?finance",
        published_at: "2023-06-09T18:45:00Z",
        source_name: "Financial Times",
        source_url: "https://example.com/financial-times",
        category: Category::Business,
    },
    SampleArticle {
        id: "3",
        title: "Breakthrough in Renewable Energy Storage Announced",
        description: "Scientists develop a new battery technology that could solve the intermittency problem of renewable energy.",
        content: "Researchers at MIT have announced a breakthrough in energy storage technology that could revolutionize renewable energy usage. The new battery system, which uses abundant materials such as aluminum and sulfur, can store electricity for long periods at one-sixth the cost of current lithium-ion batteries. This development addresses one of the main challenges of renewable energy sources like solar and wind power: their intermittent nature. \"With this technology, we can store energy when the sun is shining or the wind is blowing, and deploy it when needed,\" explained Dr. Rebecca Chen, the lead researcher on the project. The battery has demonstrated the ability to withstand thousands of charge cycles without significant degradation. Industry experts believe this could accelerate the global transition to clean energy, making renewable sources more reliable and cost-effective. Several energy companies have already expressed interest in commercializing the technology, with pilot projects expected to begin next year.",
        url: "https://example.com/renewable-energy-breakthrough",
        image: "https://source.unsplash.com/random/800x600?energy",
        published_at: "2023-06-08T09:15:00Z",
        source_name: "Science Daily",
        source_url: "https://example.com/science-daily",
        category: Category::Science,
    },
    SampleArticle {
        id: "4",
        title: "Olympic Committee Announces New Sustainability Requirements for Future Games",
        description: "Future Olympic host cities will need to meet strict environmental standards under new guidelines.",
        content: "The International Olympic Committee (IOC) has introduced comprehensive sustainability requirements for cities bidding to host future Olympic Games. Under the new framework, potential host cities must demonstrate how they will achieve carbon neutrality, minimize waste, and protect local ecosystems. \"The Olympic Games must be a force for positive change in the world,\" said IOC President Thomas Bach. \"These requirements ensure that sustainability is at the heart of planning and delivery.\" The guidelines require host cities to use existing or temporary venues whenever possible, power all Olympic facilities with renewable energy, and eliminate single-use plastics. Additionally, hosts must implement plans for sustainable transportation, responsible sourcing, and water conservation. The IOC also announced a partnership with the United Nations to monitor compliance with these standards. The new requirements will take effect immediately and apply to bids for the 2036 Summer Olympics and beyond. Environmental experts have welcomed the announcement, though some critics question whether the measures go far enough to address the Games' historical environmental impact.",
        url: "https://example.com/olympic-sustainability",
        image: "https://source.unsplash.com/random/800x600?olympics",
        published_at: "2023-06-07T16:20:00Z",
        source_name: "Sports News Network",
        source_url: "https://example.com/sports-news",
        category: Category::Sports,
    },
    SampleArticle {
        id: "5",
        title: "Major Breakthrough in Alzheimer's Treatment Shows Promise in Clinical Trials",
        description: "A new drug therapy has demonstrated significant cognitive improvements in early-stage Alzheimer's patients.",
        content: "A groundbreaking drug therapy for Alzheimer's disease has shown remarkable results in Phase 3 clinical trials, potentially offering hope to millions of patients worldwide. The treatment, developed by NeuroCure Pharmaceuticals, targets the tau protein tangles in the brain—one of the hallmarks of Alzheimer's disease. According to results published in the New England Journal of Medicine, patients receiving the drug experienced a 42% reduction in cognitive decline compared to those on placebo over an 18-month period. \"These results represent the most significant advancement in Alzheimer's treatment in decades,\" said Dr. James Wilson, who led the international study. \"For the first time, we're seeing a therapy that doesn't just slow the disease but appears to partially reverse cognitive symptoms in some patients.\" The treatment combines an antibody therapy with a novel delivery system that helps the drug cross the blood-brain barrier more effectively than previous attempts. Side effects were reported as mild to moderate, primarily consisting of headaches and dizziness. The pharmaceutical company has already submitted data to regulatory agencies and hopes to receive approval within the next year. If approved, the treatment would initially target patients with early-stage Alzheimer's, though researchers are optimistic it could eventually be used preventatively in high-risk individuals.",
        url: "https://example.com/alzheimers-breakthrough",
        image: "https://source.unsplash.com/random/800x600?medical",
        published_at: "2023-06-06T11:05:00Z",
        source_name: "Health Journal",
        source_url: "https://example.com/health-journal",
        category: Category::Health,
    },
    SampleArticle {
        id: "6",
        title: "Film Industry Embraces Virtual Production Technologies",
        description: "Hollywood studios are increasingly adopting LED-wall technology pioneered by 'The Mandalorian'.",
        content: "The film and television industry is undergoing a significant transformation as more productions adopt virtual production techniques using massive LED walls. The technology, which gained prominence with Disney's 'The Mandalorian,' creates realistic digital backgrounds in real-time, eliminating the need for green screens and post-production compositing. Major studios including Warner Bros., Universal, and Sony have invested heavily in permanent virtual production stages over the past year. \"This isn't just a trend—it's a revolution in how we make content,\" said filmmaker James Cameron, who is utilizing the technology for his upcoming projects. The LED walls display computer-generated environments that respond to camera movements, creating the illusion that actors are on location while actually filming on a soundstage. This approach offers numerous advantages: productions can 'visit' multiple locations in a single day, weather and lighting conditions can be precisely controlled, and the environmental impact of travel is reduced. Industry analysts estimate that by 2025, over 40% of major productions will use some form of virtual production. The technology has also created new job categories that blend traditional filmmaking skills with game design and real-time rendering expertise. Film schools have begun incorporating these techniques into their curricula to prepare students for the changing landscape.",
        url: "https://example.com/virtual-production",
        image: "https://source.unsplash.com/random/800x600?movie",
        published_at: "2023-06-05T08:30:00Z",
        source_name: "Entertainment Weekly",
        source_url: "https://example.com/entertainment-weekly",
        category: Category::Entertainment,
    },
];
