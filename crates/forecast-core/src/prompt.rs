//! Instruction template for the text-generation backend and parsing of its
//! `||`-delimited reply.

use chrono::NaiveDate;

use crate::{ForecastError, ForecastResult, ParsedPrompt, QueryMode};

pub const FIELD_DELIMITER: &str = "||";
pub const FIELD_COUNT: usize = 5;

const INSTRUCTION: &str = "Your job is to convert a user input into data that can be used by a code. \
The user can either request data for a single crypto ('show') or can choose to make a prediction ('predict') with a max date. \
Your job is to return a string separated by || AND NOTHING ELSE, with first being 'show' or 'predict', \
second being the cryptocurrency name (Bitcoin, Monero, Litecoin, Dogecoin, XRP, Stellar, Ethereum) and the third being a date. \
If the date overflows in months/days, you must overflow the years/months too. \
for show, just give any date. else, give a future date depending on user's input. \
If the user puts an amount invested, include it next. \
In the end, give a human like output that makes the investor make a good decision - You are an investment helper. \
Your statement should be natural and direct, don't advertise anything and don't be overly enthusiastic. \
Don't say something like 'this is an amazing opportunity'. the current date is ";

const EXAMPLES: &str = ". Eg output is given in brackets - \
(predict||Bitcoin||2024-05-05||200||Investing in Bitcoin today ... etc etc.) \
OR (show||Bitcoin||2021-05-05||0||Summary of the graph). The user's input is: ";

/// Full prompt sent to the generator for one user message.
pub fn build_instruction(current_date: NaiveDate, user_prompt: &str) -> String {
    format!(
        "{}{}{}{}",
        INSTRUCTION,
        current_date.format("%Y-%m-%d"),
        EXAMPLES,
        user_prompt
    )
}

/// Split a completion into its five fields.
///
/// Surrounding whitespace is dropped from the completion and from each field.
/// Anything other than exactly five fields is a `PromptFormat` error.
pub fn parse_completion(completion: &str) -> ForecastResult<ParsedPrompt> {
    let fields: Vec<&str> = completion
        .trim()
        .split(FIELD_DELIMITER)
        .map(str::trim)
        .collect();

    match fields.as_slice() {
        [mode, crypto_name, date, amount, summary] => Ok(ParsedPrompt {
            mode: QueryMode::from_field(mode),
            crypto_name: crypto_name.to_string(),
            date: date.to_string(),
            amount: amount.to_string(),
            summary: summary.to_string(),
        }),
        _ => Err(ForecastError::PromptFormat {
            expected: FIELD_COUNT,
            found: fields.len(),
        }),
    }
}
