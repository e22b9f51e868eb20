use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyFinancialsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Vec<AnnualStatement>,
}

/// One fiscal year of a company's statements as the provider reports it.
/// Missing line items read as 0; interest income stays unknown when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualStatement {
    #[serde(deserialize_with = "de_year")]
    pub calendar_year: i32,
    #[serde(default, deserialize_with = "de_amount")]
    pub net_income: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub operating_cash_flow: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub ebitda: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub depreciation_and_amortization: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub capital_expenditure: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub cash_and_cash_equivalents: f64,
    #[serde(default)]
    pub interest_income: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFreeRateResponse {
    pub rate: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Number(i32),
    Text(String),
}

fn de_year<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match YearRepr::deserialize(deserializer)? {
        YearRepr::Number(year) => Ok(year),
        YearRepr::Text(text) => text
            .trim()
            .parse::<i32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid calendarYear: {text}"))),
    }
}

// Providers send explicit nulls for line items they do not cover.
fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
