//! Canned answers for general questions asked at the start of a call

use super::departments::DepartmentTable;

/// General question a caller can ask before booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTopic {
    Timings,
    Departments,
    Insurance,
    Contact,
    Location,
}

impl InfoTopic {
    /// Fixed answer order when several topics are asked at once
    pub const ALL: [InfoTopic; 5] = [
        InfoTopic::Timings,
        InfoTopic::Departments,
        InfoTopic::Insurance,
        InfoTopic::Contact,
        InfoTopic::Location,
    ];

    fn triggers(self) -> &'static [&'static str] {
        match self {
            InfoTopic::Timings => &["timing", "hours"],
            InfoTopic::Departments => &["department", "specialty"],
            InfoTopic::Insurance => &["insurance"],
            InfoTopic::Contact => &["contact", "phone", "email"],
            InfoTopic::Location => &["location", "address"],
        }
    }
}

const TIMINGS: &str =
    "We are open 24/7 for emergencies. Regular consultations run 8 AM to 8 PM, Monday to Saturday.";
const INSURANCE: &str = "We accept major insurance plans including Aetna, Blue Cross, and Medicare. Please bring your insurance card.";
const CONTACT: &str = "You can call us at (555) 123-4567 or email info@hospital.com.";
const LOCATION: &str = "We are at 123 Health St, Wellness City, HC 12345.";

/// Topics mentioned in an utterance, in answer order
#[must_use]
pub fn detect_topics(utterance: &str) -> Vec<InfoTopic> {
    let lowered = utterance.to_lowercase();
    InfoTopic::ALL
        .into_iter()
        .filter(|topic| topic.triggers().iter().any(|t| lowered.contains(t)))
        .collect()
}

/// Answer for one topic; the department list comes from the routing table
#[must_use]
pub fn answer(topic: InfoTopic, departments: &DepartmentTable) -> String {
    match topic {
        InfoTopic::Timings => TIMINGS.to_string(),
        InfoTopic::Departments => {
            let names: Vec<&str> = departments.names().collect();
            format!("Our departments include: {}.", names.join(", "))
        }
        InfoTopic::Insurance => INSURANCE.to_string(),
        InfoTopic::Contact => CONTACT.to_string(),
        InfoTopic::Location => LOCATION.to_string(),
    }
}
