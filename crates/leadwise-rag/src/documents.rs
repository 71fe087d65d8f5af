// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The static knowledge base.

use serde::{Deserialize, Serialize};

/// One knowledge article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    /// Industries this article is most relevant to.
    #[serde(default)]
    pub industries: Vec<String>,
}

impl KnowledgeDocument {
    pub fn new(id: &str, title: &str, tags: &[&str], content: &str, industries: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            content: content.to_string(),
            industries: industries.iter().map(|i| (*i).to_string()).collect(),
        }
    }
}

/// Articles shipped with the assistant.
pub fn builtin() -> Vec<KnowledgeDocument> {
    vec![
        KnowledgeDocument::new(
            "services-overview",
            "Our AI automation services",
            &["services", "automation", "ai", "overview"],
            "We design and build AI-powered automation for small and mid-sized businesses: \
             conversational chatbots, lead capture and qualification, workflow automation, \
             and integrations with the tools you already use.",
            &[],
        ),
        KnowledgeDocument::new(
            "pricing",
            "Pricing and packages",
            &["pricing", "price", "cost", "packages", "budget"],
            "Projects start with a fixed-price discovery sprint. Starter automations begin \
             around $2,000, full chatbot deployments typically range from $5,000 to $15,000, \
             and ongoing support is billed monthly. Every quote is tailored after a free \
             consultation.",
            &[],
        ),
        KnowledgeDocument::new(
            "lead-qualification",
            "Lead capture and qualification",
            &["leads", "lead", "qualification", "sales", "pipeline", "crm"],
            "Our assistants capture visitor details, ask qualifying questions about budget, \
             timeline and authority, score every lead, and push hot leads straight to your \
             sales team with a summary of the conversation.",
            &["real estate", "saas", "finance"],
        ),
        KnowledgeDocument::new(
            "chatbots",
            "Website chatbots",
            &["chatbot", "chat", "website", "support", "assistant"],
            "A website chatbot answers common questions around the clock, books meetings, \
             and hands complex conversations to a human. It is trained on your own content \
             and matches your brand voice.",
            &["ecommerce", "hospitality", "healthcare"],
        ),
        KnowledgeDocument::new(
            "workflow-automation",
            "Workflow automation",
            &["workflow", "automation", "manual", "process", "efficiency"],
            "We remove repetitive manual work such as data entry, follow-up emails, report \
             generation and document handling. Typical clients save ten or more hours per \
             employee each week.",
            &["finance", "legal", "manufacturing"],
        ),
        KnowledgeDocument::new(
            "integrations",
            "Integrations",
            &["integration", "integrations", "crm", "hubspot", "salesforce", "zapier", "api"],
            "We integrate with HubSpot, Salesforce, Pipedrive, Google Workspace, Microsoft \
             365, Slack, Shopify and anything with an API, so data flows without copy and \
             paste.",
            &[],
        ),
        KnowledgeDocument::new(
            "timeline",
            "Project timeline",
            &["timeline", "schedule", "weeks", "launch", "implementation"],
            "Most chatbot projects launch in two to four weeks. Larger automation programs \
             are delivered in phases, with the first workflow live within a month.",
            &[],
        ),
        KnowledgeDocument::new(
            "demo-booking",
            "Book a demo",
            &["demo", "meeting", "call", "consultation", "booking"],
            "Book a free 30-minute consultation to walk through your current process. We \
             will show a live demo tailored to your industry and outline next steps.",
            &[],
        ),
        KnowledgeDocument::new(
            "security",
            "Security and privacy",
            &["security", "privacy", "gdpr", "data", "compliance", "hipaa"],
            "Conversation data is encrypted in transit and at rest, access is role-based, \
             and we support GDPR requests. Healthcare deployments follow HIPAA-aligned \
             practices.",
            &["healthcare", "finance", "legal"],
        ),
        KnowledgeDocument::new(
            "real-estate",
            "Automation for real estate teams",
            &["real estate", "property", "listings", "agents"],
            "For brokerages we qualify buyer and seller leads, schedule viewings, and keep \
             listings questions answered instantly so agents only talk to serious prospects.",
            &["real estate"],
        ),
    ]
}
