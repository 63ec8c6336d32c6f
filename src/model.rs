//! Enumerated values accepted by the Rekono API.
//!
//! The CLI offers the variant names as choices for the matching options and
//! sends the selected name verbatim in request bodies.

use strum::{Display, EnumString, VariantNames};

/// Role of a user in the Rekono deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum UserRole {
    Admin,
    Auditor,
    Reader,
}

/// How aggressive the tools run by a task are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum IntensityRank {
    Sneaky,
    Low,
    Normal,
    Hard,
    Insane,
}

/// Unit for task scheduling and repetition delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum WordlistType {
    Endpoint,
    Subdomain,
}

/// Authentication scheme used against a target port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, VariantNames)]
pub enum AuthenticationType {
    Basic,
    Bearer,
    Cookie,
    Digest,
    #[strum(serialize = "JWT")]
    Jwt,
    #[strum(serialize = "NTLM")]
    Ntlm,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_variant_names_match_api_values() {
        assert_eq!(UserRole::VARIANTS, &["Admin", "Auditor", "Reader"]);
        assert_eq!(
            AuthenticationType::VARIANTS,
            &["Basic", "Bearer", "Cookie", "Digest", "JWT", "NTLM"]
        );
        assert_eq!(TimeUnit::VARIANTS.len(), 4);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(IntensityRank::from_str("Normal").unwrap(), IntensityRank::Normal);
        assert_eq!(AuthenticationType::Ntlm.to_string(), "NTLM");
        assert_eq!(WordlistType::Subdomain.to_string(), "Subdomain");
    }
}
