//! Closed vocabularies for enumerated restaurant fields.
//!
//! Raw tokens from the source datasets are classified through fixed rule
//! tables. Adding a new token means extending the matching `classify`.

use std::fmt;

use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Accepted payment method, as advertised by the structural dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PaymentOption {
    /// American Express
    #[serde(rename = "AMEX")]
    Amex,
    Visa,
    Discover,
    MasterCard,
}

/// Tokens recognised but not indexed.
const IGNORED_PAYMENT_OPTIONS: &[&str] = &["Pay with OpenTable", "JCB", "Cash Only"];

impl PaymentOption {
    pub const ALL: [PaymentOption; 4] = [Self::Amex, Self::Visa, Self::Discover, Self::MasterCard];

    /// Classify a raw payment token.
    ///
    /// - canonical tokens map to themselves
    /// - "Diners Club" and "Carte Blanche" are Discover-network cards
    /// - ignored tokens return `Ok(None)`
    /// - anything else is [`PipelineError::UnknownEnumValue`]
    pub fn classify(token: &str) -> Result<Option<Self>> {
        match token {
            "AMEX" => Ok(Some(Self::Amex)),
            "Visa" => Ok(Some(Self::Visa)),
            "Discover" => Ok(Some(Self::Discover)),
            "MasterCard" => Ok(Some(Self::MasterCard)),
            "Diners Club" | "Carte Blanche" => Ok(Some(Self::Discover)),
            t if IGNORED_PAYMENT_OPTIONS.contains(&t) => {
                log::debug!("skipping unknown payment option {t:?}");
                Ok(None)
            }
            other => Err(PipelineError::unknown_payment_option(other)),
        }
    }

    /// Classify a list of tokens, dropping ignored ones and keeping order.
    pub fn classify_all<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Self>> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            if let Some(opt) = Self::classify(token.as_ref())? {
                out.push(opt);
            }
        }
        Ok(out)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amex => "AMEX",
            Self::Visa => "Visa",
            Self::Discover => "Discover",
            Self::MasterCard => "MasterCard",
        }
    }
}

impl fmt::Display for PaymentOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-person spending band from the content dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceRange {
    #[serde(rename = "$30 and under")]
    Under30,
    #[serde(rename = "$31 to $50")]
    From30To50,
    #[serde(rename = "$50 and over")]
    Over50,
}

impl PriceRange {
    pub const ALL: [PriceRange; 3] = [Self::Under30, Self::From30To50, Self::Over50];

    /// Accept exactly one of the three band labels. No normalisation is
    /// attempted: a misspelt band is a data-quality bug upstream.
    pub fn classify(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|band| band.as_str() == value)
            .ok_or_else(|| PipelineError::unknown_price_range(value))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Under30 => "$30 and under",
            Self::From30To50 => "$31 to $50",
            Self::Over50 => "$50 and over",
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const KNOWN_PAYMENT_TOKENS: &[&str] = &[
        "AMEX",
        "Visa",
        "Discover",
        "MasterCard",
        "Diners Club",
        "Carte Blanche",
        "Pay with OpenTable",
        "JCB",
        "Cash Only",
    ];

    #[test]
    fn canonical_payment_tokens_map_to_themselves() {
        for opt in PaymentOption::ALL {
            assert_eq!(PaymentOption::classify(opt.as_str()).unwrap(), Some(opt));
        }
    }

    #[test]
    fn diners_and_carte_blanche_are_discover() {
        assert_eq!(
            PaymentOption::classify("Diners Club").unwrap(),
            Some(PaymentOption::Discover)
        );
        assert_eq!(
            PaymentOption::classify("Carte Blanche").unwrap(),
            Some(PaymentOption::Discover)
        );
    }

    #[test]
    fn ignored_payment_tokens_produce_nothing() {
        for token in IGNORED_PAYMENT_OPTIONS {
            assert_eq!(PaymentOption::classify(token).unwrap(), None);
        }
    }

    #[test]
    fn unknown_payment_token_carries_value() {
        let err = PaymentOption::classify("Bitcoin").unwrap_err();
        match err {
            PipelineError::UnknownEnumValue { kind, value } => {
                assert_eq!(kind, "payment option");
                assert_eq!(value, "Bitcoin");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn payment_classification_is_case_sensitive() {
        assert!(PaymentOption::classify("visa").is_err());
        assert!(PaymentOption::classify("Amex").is_err());
    }

    #[test]
    fn classify_all_drops_ignored_and_keeps_order() {
        let tokens = ["Visa", "JCB", "Diners Club", "AMEX", "Cash Only"];
        let opts = PaymentOption::classify_all(&tokens).unwrap();
        assert_eq!(
            opts,
            vec![
                PaymentOption::Visa,
                PaymentOption::Discover,
                PaymentOption::Amex
            ]
        );
    }

    #[test]
    fn classify_all_fails_on_first_unknown() {
        let tokens = ["Visa", "Venmo", "Zelle"];
        let err = PaymentOption::classify_all(&tokens).unwrap_err();
        assert!(format!("{err}").contains("Venmo"));
    }

    #[test]
    fn price_bands_accepted_verbatim() {
        assert_eq!(
            PriceRange::classify("$30 and under").unwrap(),
            PriceRange::Under30
        );
        assert_eq!(
            PriceRange::classify("$31 to $50").unwrap(),
            PriceRange::From30To50
        );
        assert_eq!(
            PriceRange::classify("$50 and over").unwrap(),
            PriceRange::Over50
        );
    }

    #[test]
    fn price_band_near_misses_rejected() {
        for value in ["", "$30 and Under", " $31 to $50", "$31-$50", "$50+"] {
            assert!(
                matches!(
                    PriceRange::classify(value),
                    Err(PipelineError::UnknownEnumValue { .. })
                ),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn enums_serialize_as_literals() {
        assert_eq!(
            serde_json::to_string(&PaymentOption::Amex).unwrap(),
            r#""AMEX""#
        );
        assert_eq!(
            serde_json::to_string(&PriceRange::From30To50).unwrap(),
            r#""$31 to $50""#
        );
    }

    proptest! {
        #[test]
        fn any_other_payment_token_is_rejected(token in ".{0,24}") {
            prop_assume!(!KNOWN_PAYMENT_TOKENS.contains(&token.as_str()));
            match PaymentOption::classify(&token) {
                Err(PipelineError::UnknownEnumValue { value, .. }) => prop_assert_eq!(value, token),
                other => prop_assert!(false, "expected rejection, got {:?}", other),
            }
        }

        #[test]
        fn any_other_price_range_is_rejected(value in ".{0,24}") {
            prop_assume!(PriceRange::ALL.iter().all(|b| b.as_str() != value));
            prop_assert!(
                matches!(
                    PriceRange::classify(&value),
                    Err(PipelineError::UnknownEnumValue { .. })
                ),
                "expected rejection"
            );
        }
    }
}
