//! `envoy.type.matcher.v3` messages.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringMatcher {
    #[prost(oneof = "string_matcher::MatchPattern", tags = "1, 2, 3, 5, 7")]
    pub match_pattern: Option<string_matcher::MatchPattern>,
    #[prost(bool, tag = "6")]
    pub ignore_case: bool,
}

pub mod string_matcher {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MatchPattern {
        #[prost(string, tag = "1")]
        Exact(String),
        #[prost(string, tag = "2")]
        Prefix(String),
        #[prost(string, tag = "3")]
        Suffix(String),
        #[prost(message, tag = "5")]
        SafeRegex(super::RegexMatcher),
        #[prost(string, tag = "7")]
        Contains(String),
    }
}

impl StringMatcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            match_pattern: Some(string_matcher::MatchPattern::Exact(value.into())),
            ignore_case: false,
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            match_pattern: Some(string_matcher::MatchPattern::Contains(value.into())),
            ignore_case: false,
        }
    }
}

/// RE2 regular expression; Envoy selects the RE2 engine by default.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegexMatcher {
    #[prost(string, tag = "2")]
    pub regex: String,
}

impl RegexMatcher {
    pub fn new(regex: impl Into<String>) -> Self {
        Self { regex: regex.into() }
    }
}
