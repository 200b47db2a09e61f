//! Per-lead identity derivation
//!
//! Mobile numbers, emails and display names must be unique per epoch. All
//! three are derived from the run's prefix, the epoch date and the ordinal.

use crate::run::{CustomerType, Environment, RunState};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const DAY_WORDS: [&str; 32] = [
    "", "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
    "tenth", "eleventh", "twelfth", "thirteenth", "fourteenth", "fifteenth", "sixteenth",
    "seventeenth", "eighteenth", "nineteenth", "twentieth", "twentyfirst", "twentysecond",
    "twentythird", "twentyfourth", "twentyfifth", "twentysixth", "twentyseventh",
    "twentyeighth", "twentyninth", "thirtieth", "thirtyfirst",
];

const MONTH_ABBREVIATIONS: [&str; 13] = [
    "", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sept", "Oct", "Nov", "Dec",
];

const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten", "Eleven",
    "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Identity fields handed to the lead transaction for one ordinal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadIdentity {
    pub ordinal: u32,
    pub mobile_number: String,
    pub email: String,
    pub customer_name: String,
}

impl LeadIdentity {
    pub fn for_ordinal(state: &RunState, ordinal: u32) -> Self {
        let mobile_number = mobile_number(state.mobile_prefix, state.epoch_date, ordinal);
        let email = format!("{}{}{}", state.customer_name, mobile_number, state.gmail_domain);
        let customer_name = display_name(
            &state.customer_name,
            ordinal,
            state.epoch_date,
            state.environment,
            state.customer_type,
        );
        Self {
            ordinal,
            mobile_number,
            email,
            customer_name,
        }
    }
}

/// `<prefix><ddMMyy><ordinal as two digits>`
pub fn mobile_number(prefix: u8, date: NaiveDate, ordinal: u32) -> String {
    format!("{}{}{:02}", prefix, date.format("%d%m%y"), ordinal)
}

/// Display name: base name, date in words, ordinal in words.
///
/// Production DC leads carry a `Test` prefix so they can be filtered out
/// downstream.
pub fn display_name(
    base: &str,
    ordinal: u32,
    date: NaiveDate,
    environment: Environment,
    customer_type: CustomerType,
) -> String {
    let name = format!("{}{}{}", base, date_in_words(date), number_in_words(ordinal));
    if environment.is_prod() && customer_type == CustomerType::Dc {
        format!("Test{}", name)
    } else {
        name
    }
}

/// e.g. 18 Oct 2026 -> `eighteenthOcttwosix`
pub fn date_in_words(date: NaiveDate) -> String {
    let day = DAY_WORDS[date.day() as usize];
    let month = MONTH_ABBREVIATIONS[date.month() as usize];
    let year: String = format!("{:02}", date.year().rem_euclid(100))
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| DIGIT_WORDS[d as usize])
        .collect();
    format!("{}{}{}", day, month, year)
}

/// Capitalised words without separators, e.g. 42 -> `FortyTwo`
pub fn number_in_words(number: u32) -> String {
    if number == 0 {
        return "Zero".to_string();
    }
    let mut n = number;
    let mut out = String::new();
    if n >= 1000 {
        out.push_str(&number_in_words(n / 1000));
        out.push_str("Thousand");
        n %= 1000;
    }
    if n >= 100 {
        out.push_str(ONES[(n / 100) as usize]);
        out.push_str("Hundred");
        n %= 100;
    }
    if n >= 20 {
        out.push_str(TENS[(n / 10) as usize]);
        n %= 10;
    }
    if n > 0 {
        out.push_str(ONES[n as usize]);
    }
    out
}
