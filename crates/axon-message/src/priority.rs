//! Message priority classes.

use serde::{Deserialize, Serialize};

/// Delivery priority hint attached to every message.
///
/// Priority is advisory: a transport may use it to order or shed load, but
/// the kernel makes no scheduling promise beyond "messages of the same
/// priority from the same sender are never reordered".
///
/// # Example
///
/// ```
/// use axon_message::Priority;
///
/// assert_eq!(Priority::default(), Priority::Normal);
/// assert!(Priority::Critical > Priority::Low);
/// assert_eq!(Priority::High.to_string(), "high");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    /// Background traffic; may be delayed behind everything else.
    Low,

    /// Default class for ordinary inter-agent traffic.
    #[default]
    Normal,

    /// Latency-sensitive traffic.
    High,

    /// Control-plane traffic; transports should deliver ahead of all
    /// other classes where the medium allows it.
    Critical,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Normal => write!(f, "normal"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_default_is_normal() {
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::High < Priority::Critical);
    }

    #[test]
    fn priority_display() {
        assert_eq!(Priority::Low.to_string(), "low");
        assert_eq!(Priority::Critical.to_string(), "critical");
    }

    #[test]
    fn priority_serde_uppercase() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"HIGH\"");

        let restored: Priority = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(restored, Priority::Critical);
    }
}
