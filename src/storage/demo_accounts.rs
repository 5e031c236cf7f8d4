//! Sample profiles for a freshly started store.

use log::{info, warn};

use crate::error_handling::types::StorageError;
use crate::storage::storage_trait::Storage;
use crate::storage::types::{Account, NewAccount, Role};

/// Plain-text password shared by every demo account.
pub const DEMO_PASSWORD: &str = "password123";

fn profile(
    handle: &str,
    role: Role,
    display_name: &str,
    bio: &str,
    interests: &[&str],
    expertise: &[&str],
) -> NewAccount {
    NewAccount {
        handle: handle.to_string(),
        credential: String::new(),
        role,
        display_name: display_name.to_string(),
        bio: Some(bio.to_string()),
        interests: interests.iter().map(|s| s.to_string()).collect(),
        expertise: expertise.iter().map(|s| s.to_string()).collect(),
    }
}

/// The demo profiles, credential left empty.
pub fn demo_accounts() -> Vec<NewAccount> {
    vec![
        profile(
            "tech_investor",
            Role::Investor,
            "Sarah Johnson",
            "Experienced tech investor with a focus on AI and SaaS startups. Looking for innovative solutions in enterprise software.",
            &["Artificial Intelligence", "SaaS", "Enterprise Software"],
            &["Venture Capital", "Tech Scaling", "B2B Software"],
        ),
        profile(
            "green_investor",
            Role::Investor,
            "Michael Chen",
            "Impact investor focused on sustainable technology and clean energy solutions. Passionate about environmental innovation.",
            &["Clean Energy", "Sustainability", "GreenTech"],
            &["Renewable Energy", "ESG Investing", "CleanTech"],
        ),
        profile(
            "ai_startup",
            Role::Entrepreneur,
            "Alex Rivera",
            "Building an AI-powered customer service automation platform. Looking for Series A funding and strategic partnerships.",
            &["AI/ML", "Customer Service", "Enterprise Software"],
            &["Machine Learning", "Product Development"],
        ),
        profile(
            "eco_innovator",
            Role::Entrepreneur,
            "Emma Wilson",
            "Developing biodegradable packaging solutions for e-commerce. Seeking seed funding and industry connections.",
            &["Sustainable Packaging", "E-commerce", "Green Manufacturing"],
            &["Material Science", "Sustainability"],
        ),
        profile(
            "health_investor",
            Role::Investor,
            "Dr. James Lee",
            "Healthcare-focused investor with expertise in digital health and biotech. Looking for innovative healthcare solutions.",
            &["Digital Health", "Biotech", "Healthcare IT"],
            &["Healthcare", "Medical Devices", "Biotech Ventures"],
        ),
    ]
}

/// Inserts every demo profile with `credential` as its (already hashed) secret.
///
/// Handles that already exist are skipped, so seeding twice is harmless.
pub fn seed_demo_accounts(
    storage: &dyn Storage,
    credential: &str,
) -> Result<Vec<Account>, StorageError> {
    let mut created = Vec::new();
    for mut account in demo_accounts() {
        account.credential = credential.to_string();
        match storage.create_account(account) {
            Ok(a) => created.push(a),
            Err(StorageError::Conflict(e)) => warn!("Skipping demo account: {}", e),
            Err(e) => return Err(e),
        }
    }
    info!("Seeded {} demo account(s)", created.len());
    Ok(created)
}
