// SPDX-FileCopyrightText: 2026 Leadwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword families and their canned replies.

use strum::{Display, EnumString};

/// The fixed reply to the first message of every session.
pub const GREETING: &str = "Hi there! I'm the Leadwise assistant. I help businesses automate \
     lead capture, customer support and repetitive workflows with AI. What does your business \
     do, and what would you most like to improve?";

/// Topic a message is answered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RuleFamily {
    Greeting,
    Pricing,
    Leads,
    Scheduling,
    Support,
    Automation,
    Integration,
    Chatbot,
    Thanks,
    Goodbye,
    Fallback,
}

/// Families checked in order; the first with a keyword hit wins.
///
/// Keywords match whole words, a trailing plural "s" included. A trailing
/// `*` marks a stem that matches any word starting with it.
const KEYWORDS: &[(RuleFamily, &[&str])] = &[
    (RuleFamily::Goodbye, &["bye", "goodbye", "see you", "talk later", "that's all"]),
    (RuleFamily::Thanks, &["thank*", "appreciate*", "cheers"]),
    (
        RuleFamily::Pricing,
        &["price", "pricing", "cost", "how much", "budget", "quote", "expensive", "fee"],
    ),
    (
        RuleFamily::Scheduling,
        &["demo", "schedul*", "book", "booking", "meeting", "call", "appointment", "calendar"],
    ),
    (
        RuleFamily::Leads,
        &["lead", "prospect", "pipeline", "conversion", "qualif*", "sales"],
    ),
    (
        RuleFamily::Integration,
        &["integrat*", "crm", "hubspot", "salesforce", "zapier", "api", "connect*"],
    ),
    (RuleFamily::Chatbot, &["chatbot", "bot", "chat widget", "assistant", "live chat"]),
    (
        RuleFamily::Automation,
        &["automat*", "workflow", "manual*", "repetitive", "data entry", "process", "processes"],
    ),
    (
        RuleFamily::Support,
        &["help", "support", "problem", "issue", "broken", "error", "not working"],
    ),
    (
        RuleFamily::Greeting,
        &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"],
    ),
];

/// Picks the family for a message. Falls back to [`RuleFamily::Fallback`].
pub fn classify(text: &str) -> RuleFamily {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| phrase_matches(&words, k)))
        .map(|(family, _)| *family)
        .unwrap_or(RuleFamily::Fallback)
}

/// True when consecutive `words` match every word of `keyword`.
fn phrase_matches(words: &[&str], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words
        .windows(parts.len())
        .any(|window| window.iter().zip(&parts).all(|(word, part)| word_matches(word, part)))
}

fn word_matches(word: &str, keyword: &str) -> bool {
    match keyword.strip_suffix('*') {
        Some(stem) => word.starts_with(stem),
        None => word == keyword || word.strip_suffix('s') == Some(keyword),
    }
}

/// Canned reply variants for a family.
pub fn replies(family: RuleFamily) -> &'static [&'static str] {
    match family {
        RuleFamily::Greeting => &[
            "Hello again! Tell me a little about your business and I can point you to the \
             automations that fit best.",
            "Hey! Are you mostly looking to capture more leads, support customers faster, or \
             cut down on manual work?",
            "Good to hear from you. Which part of your day feels the most repetitive right now?",
        ],
        RuleFamily::Pricing => &[
            "Our projects start with a fixed-price discovery sprint. Starter automations begin \
             around $2,000 and full chatbot deployments usually land between $5,000 and $15,000.",
            "Pricing depends on scope. Most clients start small with one workflow and expand \
             once they see the time savings. What budget range are you working with?",
            "Every quote is tailored after a free consultation, so you only pay for what you \
             need. Want me to set one up?",
        ],
        RuleFamily::Leads => &[
            "We build assistants that capture visitor details, ask qualifying questions and \
             send hot leads straight to your sales team.",
            "Lead qualification is one of our most popular services. Each lead gets scored on \
             budget, timeline and authority so your team focuses on serious buyers.",
            "How many inbound leads do you see each month? That helps me estimate how much \
             time automated qualification could save you.",
        ],
        RuleFamily::Scheduling => &[
            "Happy to set up a free 30-minute consultation. We'll walk through your current \
             process and show a live demo for your industry.",
            "Booking a demo is the fastest way to see it working. Which days suit you best?",
            "Our team can usually meet within two business days. Would a morning or afternoon \
             call work better?",
        ],
        RuleFamily::Support => &[
            "Sorry to hear you're running into trouble. Can you describe what is happening so \
             I can point you in the right direction?",
            "Our support automations answer common questions around the clock and hand tricky \
             cases to a human. Is that the kind of help you're after?",
            "I'd like to help with that. What tools are involved and what did you expect to \
             happen?",
        ],
        RuleFamily::Automation => &[
            "We remove repetitive work like data entry, follow-up emails and report \
             generation. Most clients save ten or more hours per employee every week.",
            "Which task eats up the most time for your team? That's usually the best first \
             workflow to automate.",
            "Automation projects are delivered in phases, with the first workflow typically \
             live within a month.",
        ],
        RuleFamily::Integration => &[
            "We integrate with HubSpot, Salesforce, Pipedrive, Google Workspace, Slack, \
             Shopify and anything that has an API.",
            "Which tools does your team rely on today? We'll connect them so data flows \
             without copy and paste.",
            "Integrations are included in every project, so your chatbot and workflows update \
             your CRM automatically.",
        ],
        RuleFamily::Chatbot => &[
            "Our website chatbots answer questions around the clock, book meetings and hand \
             complex conversations to your team.",
            "Each chatbot is trained on your own content and matches your brand voice. Most \
             launch in two to four weeks.",
            "What would you want a chatbot to handle first: answering FAQs, qualifying leads, \
             or booking appointments?",
        ],
        RuleFamily::Thanks => &[
            "You're welcome! Is there anything else I can help you with?",
            "Glad I could help. Let me know if any other questions come up.",
            "Anytime! If you'd like, I can set up a quick call with our team.",
        ],
        RuleFamily::Goodbye => &[
            "Thanks for stopping by! Feel free to come back any time.",
            "Talk soon! If you want to pick this up later, just send a message.",
            "Have a great day, and good luck with your project!",
        ],
        RuleFamily::Fallback => &[
            "That's a great question. Could you tell me a bit more about your business so I \
             can give you a useful answer?",
            "I want to make sure I understand. Are you asking about pricing, lead generation, \
             or automating a workflow?",
            "We help with chatbots, lead qualification and workflow automation. Which of those \
             is closest to what you need?",
        ],
    }
}

/// The human hand-off reply used when every canned variant was already said.
pub fn contact_reply(contact_email: &str) -> String {
    format!(
        "I don't want to repeat myself, so let's get a person involved. Email our team at \
         {contact_email} and someone will reply within one business day."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_families() {
        assert_eq!(classify("How much does it cost?"), RuleFamily::Pricing);
        assert_eq!(classify("can we book a demo"), RuleFamily::Scheduling);
        assert_eq!(classify("hi"), RuleFamily::Greeting);
        assert_eq!(classify("thanks a lot"), RuleFamily::Thanks);
        assert_eq!(classify("does it work with HubSpot"), RuleFamily::Integration);
        assert_eq!(classify("tell me about your chatbot"), RuleFamily::Chatbot);
        assert_eq!(classify("ok bye"), RuleFamily::Goodbye);
        assert_eq!(classify("what is the weather"), RuleFamily::Fallback);
    }

    #[test]
    fn stems_and_phrases_match() {
        assert_eq!(classify("Can you integrate with our CRM?"), RuleFamily::Integration);
        assert_eq!(classify("we are automating invoices"), RuleFamily::Automation);
        assert_eq!(classify("How do you qualify leads?"), RuleFamily::Leads);
        assert_eq!(classify("Scheduling a call next week"), RuleFamily::Scheduling);
        assert_eq!(classify("That's all, thanks"), RuleFamily::Goodbye);
        assert_eq!(classify("the form is not working"), RuleFamily::Support);
        assert_eq!(classify("what are your fees"), RuleFamily::Pricing);
    }

    #[test]
    fn keywords_do_not_match_inside_other_words() {
        for text in [
            "we both agree",
            "rapid growth",
            "any feedback so far",
            "I can't recall",
            "our team leader",
            "this is a notebook",
            "hierarchy",
        ] {
            assert_eq!(classify(text), RuleFamily::Fallback, "{text}");
        }
    }

    #[test]
    fn every_family_has_distinct_variants() {
        for family in [
            RuleFamily::Greeting,
            RuleFamily::Pricing,
            RuleFamily::Leads,
            RuleFamily::Scheduling,
            RuleFamily::Support,
            RuleFamily::Automation,
            RuleFamily::Integration,
            RuleFamily::Chatbot,
            RuleFamily::Thanks,
            RuleFamily::Goodbye,
            RuleFamily::Fallback,
        ] {
            let variants = replies(family);
            assert!(variants.len() >= 3, "{family}");
            for (i, a) in variants.iter().enumerate() {
                for b in &variants[i + 1..] {
                    assert!(!crate::overlap::overlaps(a, b), "{family}: {a}");
                }
            }
        }
    }
}
