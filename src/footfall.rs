use crate::errors::AppError;
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FootfallVariant {
    WeeklyCurrent,
    WeeklyHistorical,
    MonthlyCurrent,
    MonthlyHistorical,
    QuarterlyCurrent,
    QuarterlyHistorical,
    YearlyCurrent,
    YearlyHistorical,
}

impl FootfallVariant {
    pub const ALL: [FootfallVariant; 8] = [
        Self::WeeklyCurrent,
        Self::WeeklyHistorical,
        Self::MonthlyCurrent,
        Self::MonthlyHistorical,
        Self::QuarterlyCurrent,
        Self::QuarterlyHistorical,
        Self::YearlyCurrent,
        Self::YearlyHistorical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeeklyCurrent => "weekly_current",
            Self::WeeklyHistorical => "weekly_historical",
            Self::MonthlyCurrent => "monthly_current",
            Self::MonthlyHistorical => "monthly_historical",
            Self::QuarterlyCurrent => "quarterly_current",
            Self::QuarterlyHistorical => "quarterly_historical",
            Self::YearlyCurrent => "yearly_current",
            Self::YearlyHistorical => "yearly_historical",
        }
    }
}

impl FromStr for FootfallVariant {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == value.trim())
            .ok_or_else(|| AppError::validation(format!("unknown footfall variant '{value}'")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootfallSeries {
    #[serde(default)]
    pub male: Vec<i64>,
    #[serde(default)]
    pub female: Vec<i64>,
    #[serde(default)]
    pub children: Vec<i64>,
    #[serde(default)]
    pub unknown: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FootfallDistribution {
    pub series: BTreeMap<String, FootfallSeries>,
}

impl FootfallDistribution {
    pub fn get(&self, variant: FootfallVariant) -> Option<&FootfallSeries> {
        self.series.get(variant.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub variant: FootfallVariant,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

pub fn build_chart(distribution: &FootfallDistribution, variant: FootfallVariant) -> Result<ChartData, AppError> {
    build_chart_at(Local::now().date_naive(), distribution, variant)
}

pub fn build_chart_at(
    today: NaiveDate,
    distribution: &FootfallDistribution,
    variant: FootfallVariant,
) -> Result<ChartData, AppError> {
    let series = distribution.get(variant).ok_or_else(|| {
        AppError::data_shape(format!(
            "footfall distribution has no '{}' series",
            variant.as_str()
        ))
    })?;

    Ok(ChartData {
        variant,
        labels: period_labels(today, variant),
        datasets: vec![
            Dataset {
                label: "Male",
                data: series.male.clone(),
            },
            Dataset {
                label: "Female",
                data: series.female.clone(),
            },
            Dataset {
                label: "Children",
                data: series.children.clone(),
            },
            Dataset {
                label: "Unknown",
                data: series.unknown.clone(),
            },
        ],
    })
}

/// Axis labels for a variant, oldest first. Weeks start on Sunday.
pub fn period_labels(today: NaiveDate, variant: FootfallVariant) -> Vec<String> {
    match variant {
        FootfallVariant::WeeklyCurrent => day_labels(today),
        FootfallVariant::WeeklyHistorical => day_labels(week_start(today)),
        FootfallVariant::MonthlyCurrent => week_labels(today, 0..=3),
        FootfallVariant::MonthlyHistorical => week_labels(today, 1..=4),
        FootfallVariant::QuarterlyCurrent => month_labels(today, 0..=2),
        FootfallVariant::QuarterlyHistorical => month_labels(today, 1..=3),
        FootfallVariant::YearlyCurrent => quarter_labels(today, 0..=3),
        FootfallVariant::YearlyHistorical => quarter_labels(today, 1..=4),
    }
}

fn day_labels(last: NaiveDate) -> Vec<String> {
    (0..7)
        .rev()
        .map(|offset| {
            let date = last - Duration::days(offset);
            format!("{}/{} {}", date.month(), date.day(), date.weekday())
        })
        .collect()
}

fn week_labels(today: NaiveDate, weeks_back: std::ops::RangeInclusive<i64>) -> Vec<String> {
    let current = week_start(today);
    weeks_back
        .rev()
        .enumerate()
        .map(|(i, offset)| {
            let start = current - Duration::weeks(offset);
            let end = start + Duration::days(6);
            format!(
                "Week {} ({}/{} - {}/{})",
                i + 1,
                start.month(),
                start.day(),
                end.month(),
                end.day()
            )
        })
        .collect()
}

fn month_labels(today: NaiveDate, months_back: std::ops::RangeInclusive<i32>) -> Vec<String> {
    let index = today.year() * 12 + today.month0() as i32;
    months_back
        .rev()
        .map(|offset| {
            let shifted = index - offset;
            let year = shifted.div_euclid(12);
            let month = shifted.rem_euclid(12) as usize;
            format!("{year} {}", MONTH_ABBR[month])
        })
        .collect()
}

fn quarter_labels(today: NaiveDate, quarters_back: std::ops::RangeInclusive<i32>) -> Vec<String> {
    let index = today.year() * 4 + (today.month0() / 3) as i32;
    quarters_back
        .rev()
        .map(|offset| {
            let shifted = index - offset;
            format!("{} Q{}", shifted.div_euclid(4), shifted.rem_euclid(4) + 1)
        })
        .collect()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Built charts keyed by canvas id; building again for the same canvas
/// replaces the previous chart.
#[derive(Debug, Clone, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<String, ChartData>,
}

impl ChartRegistry {
    pub fn replace(&mut self, canvas_id: &str, chart: ChartData) -> Option<ChartData> {
        self.charts.insert(canvas_id.to_string(), chart)
    }

    pub fn get(&self, canvas_id: &str) -> Option<&ChartData> {
        self.charts.get(canvas_id)
    }
}
