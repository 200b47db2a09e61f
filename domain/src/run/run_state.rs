//! Typed, validated view over the effective configuration

use super::city::CityCode;
use super::customer_type::CustomerType;
use super::environment::Environment;
use super::epoch;
use super::validation::{
    MOBILE_PREFIX_RANGE, NUMBERING_CEILING, ValidationError, ValidationErrors,
};
use crate::config::{EffectiveConfig, keys};
use chrono::NaiveDate;
use serde::Serialize;

const DEFAULT_MOBILE_PREFIX: &str = "99";
const DEFAULT_LEAD_COUNT: &str = "1";
const DEFAULT_LAST_PROCESSED: &str = "0";

/// Parameters of one batch run.
///
/// Built once at run start. The epoch decision is frozen here: a run that
/// crosses midnight keeps numbering in the epoch it started in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub environment: Environment,
    pub customer_type: CustomerType,
    pub city_code: CityCode,
    pub mobile_prefix: u8,
    pub lead_count: u32,
    pub last_run_date: Option<NaiveDate>,
    /// Last ordinal recorded by a previous run (as persisted)
    pub last_processed_index: u32,
    /// Ordinal of the next lead to attempt
    pub resume_index: u32,
    /// Calendar date the epoch decision was made for
    pub epoch_date: NaiveDate,
    pub customer_name: String,
    pub gmail_domain: String,
}

impl RunState {
    /// Build and validate a run state.
    ///
    /// Every check is evaluated; on failure all problems are returned
    /// together.
    pub fn from_config(
        config: &EffectiveConfig,
        today: NaiveDate,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();

        let environment = match config.text(keys::ENVIRONMENT) {
            Some(raw) => raw.parse::<Environment>().map_err(|_| raw.to_string()),
            None => Err(String::new()),
        }
        .map_err(|found| {
            errors.push(ValidationError::MissingRequiredField {
                field: keys::ENVIRONMENT,
                found: (!found.is_empty()).then_some(found),
            })
        })
        .ok();

        let customer_type = match config.text(keys::CUSTOMER_TYPE) {
            Some(raw) => raw.parse::<CustomerType>().map_err(|_| raw.to_string()),
            None => Err(String::new()),
        }
        .map_err(|found| {
            errors.push(ValidationError::MissingRequiredField {
                field: keys::CUSTOMER_TYPE,
                found: (!found.is_empty()).then_some(found),
            })
        })
        .ok();

        let city_code = config.text(keys::CITY).map(CityCode::new);
        if city_code.is_none() {
            errors.push(ValidationError::MissingRequiredField {
                field: keys::CITY,
                found: None,
            });
        }

        let prefix_raw = config.text(keys::MOBILE_PREFIX).unwrap_or(DEFAULT_MOBILE_PREFIX);
        let mobile_prefix = parse_mobile_prefix(prefix_raw)
            .map_err(|e| errors.push(e))
            .ok();

        let count_raw = config.text(keys::LEAD_COUNT).unwrap_or(DEFAULT_LEAD_COUNT);
        let lead_count = match count_raw.parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                errors.push(ValidationError::InvalidLeadCount {
                    found: count_raw.to_string(),
                });
                None
            }
        };

        let last_raw = config
            .text(keys::LAST_PROCESSED_INDEX)
            .unwrap_or(DEFAULT_LAST_PROCESSED);
        let last_processed_index = last_raw
            .parse::<u32>()
            .map_err(|_| {
                errors.push(ValidationError::InvalidResumeIndex {
                    found: last_raw.to_string(),
                })
            })
            .ok();

        let last_run_date = match config.text(keys::RUN_DATE) {
            None => Some(None),
            Some(raw) => match epoch::parse_run_date(raw) {
                Some(date) => Some(Some(date)),
                None => {
                    errors.push(ValidationError::InvalidRunDate {
                        found: raw.to_string(),
                    });
                    None
                }
            },
        };

        let resume_index = match (last_processed_index, last_run_date) {
            (Some(last), Some(date)) => Some(epoch::resume_index(last, date, today)),
            _ => None,
        };

        if let (Some(resume), Some(count)) = (resume_index, lead_count)
            && let Err(e) = check_budget(resume, count)
        {
            errors.push(e);
        }

        match (
            environment,
            customer_type,
            city_code,
            mobile_prefix,
            lead_count,
            last_processed_index,
            last_run_date,
            resume_index,
        ) {
            (
                Some(environment),
                Some(customer_type),
                Some(city_code),
                Some(mobile_prefix),
                Some(lead_count),
                Some(last_processed_index),
                Some(last_run_date),
                Some(resume_index),
            ) if errors.is_empty() => Ok(Self {
                environment,
                customer_type,
                city_code,
                mobile_prefix,
                lead_count,
                last_run_date,
                last_processed_index,
                resume_index,
                epoch_date: today,
                customer_name: config
                    .text(keys::CUSTOMER_NAME)
                    .unwrap_or_default()
                    .to_string(),
                gmail_domain: config
                    .text(keys::GMAIL_DOMAIN)
                    .unwrap_or_default()
                    .to_string(),
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }

    /// Re-check the invariants that must hold before a batch starts
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if !MOBILE_PREFIX_RANGE.contains(&self.mobile_prefix) {
            errors.push(ValidationError::InvalidMobilePrefix {
                found: self.mobile_prefix.to_string(),
            });
        }
        if self.lead_count == 0 {
            errors.push(ValidationError::InvalidLeadCount {
                found: "0".to_string(),
            });
        }
        if self.resume_index == 0 {
            errors.push(ValidationError::InvalidResumeIndex {
                found: "0".to_string(),
            });
        }
        if let Err(e) = check_budget(self.resume_index, self.lead_count) {
            errors.push(e);
        }
        ValidationErrors(errors).into_result()
    }

    /// Whether this run started a fresh numbering epoch
    pub fn is_new_epoch(&self) -> bool {
        epoch::starts_new_epoch(self.last_run_date, self.epoch_date)
    }

    /// Ordinal to persist if no lead succeeds in this run
    pub fn last_successful_before_run(&self) -> u32 {
        self.resume_index - 1
    }

    /// Last ordinal this run would reach if every lead succeeds
    pub fn final_ordinal(&self) -> u32 {
        self.resume_index + self.lead_count - 1
    }
}

fn parse_mobile_prefix(raw: &str) -> Result<u8, ValidationError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|p| MOBILE_PREFIX_RANGE.contains(p))
        .ok_or_else(|| ValidationError::InvalidMobilePrefix {
            found: raw.to_string(),
        })
}

fn check_budget(resume_index: u32, lead_count: u32) -> Result<(), ValidationError> {
    if resume_index.saturating_add(lead_count) < NUMBERING_CEILING {
        Ok(())
    } else {
        Err(ValidationError::NumberingBudgetExceeded {
            resume_index,
            lead_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLayer, LayerKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn config(pairs: &[(&str, &str)]) -> EffectiveConfig {
        let mut base = vec![
            ("environment", "preProd"),
            ("customerType", "HL"),
            ("userSelectedCityProperty", "BLR"),
            ("mobileNoStarting2digitPrefix", "77"),
            ("totalLeadsToCreate", "5"),
            ("lastProcessedLeadIndex", "40"),
            ("leadScriptRunDate", "18-10-2026"),
            ("customerName", "Asha"),
            ("gmailDomain", "@example.com"),
        ];
        for (k, v) in pairs {
            base.retain(|(bk, _)| bk != k);
            base.push((*k, *v));
        }
        EffectiveConfig::merge(&[ConfigLayer::from_pairs(
            "userConfigurations.properties",
            LayerKind::RunParameters,
            base,
        )])
    }

    #[test]
    fn test_valid_config_builds_state() {
        let state = RunState::from_config(&config(&[]), today()).unwrap();
        assert_eq!(state.environment, Environment::PreProd);
        assert_eq!(state.customer_type, CustomerType::Hl);
        assert_eq!(state.city_code.as_str(), "BLR");
        assert_eq!(state.mobile_prefix, 77);
        assert_eq!(state.lead_count, 5);
        assert_eq!(state.resume_index, 41);
        assert_eq!(state.final_ordinal(), 45);
        assert!(!state.is_new_epoch());
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_yesterday_resets_to_first_ordinal() {
        let cfg = config(&[("leadScriptRunDate", "17-10-2026")]);
        let state = RunState::from_config(&cfg, today()).unwrap();
        assert_eq!(state.resume_index, 1);
        assert_eq!(state.last_successful_before_run(), 0);
        assert!(state.is_new_epoch());
    }

    #[test]
    fn test_today_continues_from_persisted_index() {
        let state = RunState::from_config(&config(&[]), today()).unwrap();
        assert_eq!(state.resume_index, 41);
        assert_eq!(state.last_successful_before_run(), 40);
    }

    #[test]
    fn test_mobile_prefix_boundaries() {
        for ok in ["60", "99"] {
            let cfg = config(&[("mobileNoStarting2digitPrefix", ok)]);
            let result = RunState::from_config(&cfg, today());
            assert!(result.is_ok(), "prefix {} should be accepted", ok);
        }
        for bad in ["59", "100", "ab", "-1"] {
            let cfg = config(&[("mobileNoStarting2digitPrefix", bad)]);
            let errors = RunState::from_config(&cfg, today()).unwrap_err();
            assert!(
                errors.contains(|e| matches!(e, ValidationError::InvalidMobilePrefix { .. })),
                "prefix {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_missing_prefix_defaults_to_99() {
        let mut cfg_pairs = vec![
            ("environment", "prod"),
            ("customerType", "DC"),
            ("userSelectedCityProperty", "HYD"),
        ];
        cfg_pairs.push(("totalLeadsToCreate", "2"));
        let cfg = EffectiveConfig::merge(&[ConfigLayer::from_pairs(
            "run",
            LayerKind::RunParameters,
            cfg_pairs,
        )]);
        let state = RunState::from_config(&cfg, today()).unwrap();
        assert_eq!(state.mobile_prefix, 99);
        assert_eq!(state.resume_index, 1);
    }

    #[test]
    fn test_budget_exceeded_at_ceiling() {
        // resume 41 + 59 = 100
        let cfg = config(&[("totalLeadsToCreate", "59")]);
        let errors = RunState::from_config(&cfg, today()).unwrap_err();
        assert_eq!(
            errors.0,
            vec![ValidationError::NumberingBudgetExceeded {
                resume_index: 41,
                lead_count: 59
            }]
        );

        // resume 41 + 58 = 99
        let cfg = config(&[("totalLeadsToCreate", "58")]);
        assert!(RunState::from_config(&cfg, today()).is_ok());
    }

    #[test]
    fn test_budget_uses_reset_index_on_new_epoch() {
        let cfg = config(&[("leadScriptRunDate", "01-01-2026"), ("totalLeadsToCreate", "98")]);
        let state = RunState::from_config(&cfg, today()).unwrap();
        assert_eq!(state.resume_index, 1);
    }

    #[test]
    fn test_all_errors_reported_together() {
        let cfg = config(&[
            ("environment", "staging"),
            ("customerType", ""),
            ("mobileNoStarting2digitPrefix", "12"),
            ("totalLeadsToCreate", "70"),
        ]);
        let errors = RunState::from_config(&cfg, today()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(|e| matches!(
            e,
            ValidationError::MissingRequiredField {
                field: "environment",
                found: Some(f),
            } if f == "staging"
        )));
        assert!(errors.contains(|e| matches!(
            e,
            ValidationError::MissingRequiredField {
                field: "customerType",
                found: None,
            }
        )));
        assert!(errors.contains(|e| matches!(e, ValidationError::InvalidMobilePrefix { .. })));
        assert!(errors.contains(|e| matches!(e, ValidationError::NumberingBudgetExceeded { .. })));
    }

    #[test]
    fn test_zero_lead_count_rejected() {
        let cfg = config(&[("totalLeadsToCreate", "0")]);
        let errors = RunState::from_config(&cfg, today()).unwrap_err();
        assert!(errors.contains(|e| matches!(e, ValidationError::InvalidLeadCount { .. })));
    }

    #[test]
    fn test_unparseable_run_date_rejected() {
        let cfg = config(&[("leadScriptRunDate", "yesterday")]);
        let errors = RunState::from_config(&cfg, today()).unwrap_err();
        assert!(errors.contains(|e| matches!(e, ValidationError::InvalidRunDate { .. })));
    }

    #[test]
    fn test_validate_catches_mutated_state() {
        let mut state = RunState::from_config(&config(&[]), today()).unwrap();
        state.resume_index = 95;
        let errors = state.validate().unwrap_err();
        assert!(errors.contains(|e| matches!(e, ValidationError::NumberingBudgetExceeded { .. })));
    }

    #[test]
    fn test_huge_persisted_index_is_rejected() {
        let cfg = config(&[("lastProcessedLeadIndex", "4294967295")]);
        let errors = RunState::from_config(&cfg, today()).unwrap_err();
        assert_eq!(
            errors.0,
            vec![ValidationError::NumberingBudgetExceeded {
                resume_index: u32::MAX,
                lead_count: 5
            }]
        );
    }
}
