//! Price distributions per commodity, for the box plot of market prices.

use std::collections::HashMap;

use log::{debug, info};

use crate::config::FlowErrors;
use crate::present::format_count;

const FUEL_KEYWORDS: [&str; 6] = ["diesel", "petrol", "benzina", "kerosene", "fuel", "gas"];

// English and Italian names.
const ESSENTIAL_KEYWORDS: [&str; 20] = [
    "farina", "flour", "uova", "eggs", "riso", "rice", "fagioli", "beans", "pane", "bread",
    "zucchero", "sugar", "sale", "salt", "olio", "oil", "latte", "milk", "burro", "butter",
];

/// One row of the market prices dataset.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PriceObservation {
    pub commodity: String,
    /// First level administrative region.
    pub region: String,
    /// 0 when the price could not be read.
    pub price: f64,
    pub date: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CommodityCategory {
    Fuel,
    Essential,
    Other,
}

impl CommodityCategory {
    /// Fuel keywords take precedence: "gas oil" is a fuel.
    pub fn of(commodity: &str) -> CommodityCategory {
        let lower = commodity.to_lowercase();
        if FUEL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            CommodityCategory::Fuel
        } else if ESSENTIAL_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            CommodityCategory::Essential
        } else {
            CommodityCategory::Other
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CommodityCategory),
}

impl CategoryFilter {
    pub fn from_key(key: &str) -> Result<CategoryFilter, FlowErrors> {
        match key.trim().to_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "fuel" => Ok(CategoryFilter::Only(CommodityCategory::Fuel)),
            "essential" => Ok(CategoryFilter::Only(CommodityCategory::Essential)),
            "other" => Ok(CategoryFilter::Only(CommodityCategory::Other)),
            _ => Err(FlowErrors::UnknownCategory(key.to_string())),
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(CommodityCategory::Fuel) => "fuel",
            CategoryFilter::Only(CommodityCategory::Essential) => "essential",
            CategoryFilter::Only(CommodityCategory::Other) => "other",
        }
    }

    pub fn accepts(&self, category: CommodityCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct BoxStats {
    pub commodity: String,
    pub category: CommodityCategory,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    /// In increasing order.
    pub outliers: Vec<f64>,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(PartialEq, Debug, Clone)]
pub enum BoxPlotOutcome {
    /// One entry per commodity, sorted by name.
    Boxes(Vec<BoxStats>),
    NoData,
}

/// The p-quantile of sorted values, interpolating linearly between ranks.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let i = ((sorted.len() - 1) as f64) * p.clamp(0.0, 1.0);
    let i0 = i.floor() as usize;
    let lower = sorted[i0];
    match sorted.get(i0 + 1) {
        Some(upper) => Some(lower + (upper - lower) * (i - i0 as f64)),
        None => Some(lower),
    }
}

fn box_of(commodity: &str, mut prices: Vec<f64>) -> Option<BoxStats> {
    prices.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&prices, 0.25)?;
    let median = quantile(&prices, 0.5)?;
    let q3 = quantile(&prices, 0.75)?;
    let min = *prices.first()?;
    let max = *prices.last()?;
    let iqr = q3 - q1;
    let whisker_low = min.max(q1 - 1.5 * iqr);
    let whisker_high = max.min(q3 + 1.5 * iqr);
    let outliers: Vec<f64> = prices
        .iter()
        .cloned()
        .filter(|p| *p < whisker_low || *p > whisker_high)
        .collect();
    Some(BoxStats {
        commodity: commodity.to_string(),
        category: CommodityCategory::of(commodity),
        q1,
        median,
        q3,
        iqr,
        whisker_low,
        whisker_high,
        outliers,
        min,
        max,
        count: prices.len(),
    })
}

/// Computes one box per commodity.
///
/// Observations without a commodity or with a price that is not positive are
/// ignored.
pub fn compute_box_stats(coll: &[PriceObservation], filter: CategoryFilter) -> BoxPlotOutcome {
    info!(
        "compute_box_stats: processing {:?} observations, filter: {}",
        coll.len(),
        filter.key()
    );
    let mut order: Vec<&str> = Vec::new();
    let mut prices: HashMap<&str, Vec<f64>> = HashMap::new();
    let mut dropped: usize = 0;
    for obs in coll.iter() {
        let commodity = obs.commodity.trim();
        if commodity.is_empty() || obs.price.is_nan() || obs.price <= 0.0 {
            dropped += 1;
            continue;
        }
        if !filter.accepts(CommodityCategory::of(commodity)) {
            continue;
        }
        prices
            .entry(commodity)
            .or_insert_with(|| {
                order.push(commodity);
                Vec::new()
            })
            .push(obs.price);
    }
    debug!(
        "compute_box_stats: {:?} commodities, {:?} invalid observations",
        order.len(),
        dropped
    );

    let mut boxes: Vec<BoxStats> = order
        .iter()
        .filter_map(|c| prices.remove(c).and_then(|p| box_of(c, p)))
        .collect();
    if boxes.is_empty() {
        info!("compute_box_stats: no data for filter {}", filter.key());
        return BoxPlotOutcome::NoData;
    }
    boxes.sort_by(|a, b| {
        a.commodity
            .to_lowercase()
            .cmp(&b.commodity.to_lowercase())
            .then_with(|| a.commodity.cmp(&b.commodity))
    });
    BoxPlotOutcome::Boxes(boxes)
}

fn format_price(x: f64) -> String {
    format_count(x.round().max(0.0) as u64)
}

pub fn box_tooltip(b: &BoxStats) -> String {
    format!(
        "{}\nMedian: {}\nQ1: {}\nQ3: {}\nIQR: {}\nWhiskers: {} - {}\nData points: {}",
        b.commodity,
        format_price(b.median),
        format_price(b.q1),
        format_price(b.q3),
        format_price(b.iqr),
        format_price(b.whisker_low),
        format_price(b.whisker_high),
        b.count
    )
}

pub fn outlier_tooltip(commodity: &str, price: f64) -> String {
    format!("{}\nOutlier: {}", commodity, format_price(price))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(commodity: &str, price: f64) -> PriceObservation {
        PriceObservation {
            commodity: commodity.to_string(),
            region: "Sana'a".to_string(),
            price,
            date: "2020-01-15".to_string(),
        }
    }

    fn boxes(outcome: BoxPlotOutcome) -> Vec<BoxStats> {
        match outcome {
            BoxPlotOutcome::Boxes(b) => b,
            BoxPlotOutcome::NoData => panic!("expected boxes"),
        }
    }

    #[test]
    fn quantiles() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile(&[10.0, 20.0], 0.25), Some(12.5));
        assert_eq!(quantile(&[10.0, 20.0], 0.5), Some(15.0));
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.75), Some(3.25));
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 1.0), Some(4.0));
    }

    #[test]
    fn categories() {
        assert_eq!(CommodityCategory::of("Diesel"), CommodityCategory::Fuel);
        assert_eq!(CommodityCategory::of("Wheat flour"), CommodityCategory::Essential);
        assert_eq!(CommodityCategory::of("Vegetable oil"), CommodityCategory::Essential);
        assert_eq!(CommodityCategory::of("Gas oil"), CommodityCategory::Fuel);
        assert_eq!(CommodityCategory::of("Onions"), CommodityCategory::Other);
        assert_eq!(
            CategoryFilter::from_key(" Fuel "),
            Ok(CategoryFilter::Only(CommodityCategory::Fuel))
        );
        assert_eq!(
            CategoryFilter::from_key("cheap"),
            Err(FlowErrors::UnknownCategory("cheap".to_string()))
        );
    }

    #[test]
    fn box_with_outlier() {
        let coll: Vec<PriceObservation> = [4.0, 2.0, 100.0, 1.0, 3.0]
            .iter()
            .map(|p| obs("Rice", *p))
            .collect();
        let b = boxes(compute_box_stats(&coll, CategoryFilter::All));
        assert_eq!(b.len(), 1);
        let rice = &b[0];
        assert_eq!(rice.q1, 2.0);
        assert_eq!(rice.median, 3.0);
        assert_eq!(rice.q3, 4.0);
        assert_eq!(rice.iqr, 2.0);
        assert_eq!(rice.whisker_low, 1.0);
        assert_eq!(rice.whisker_high, 7.0);
        assert_eq!(rice.outliers, vec![100.0]);
        assert_eq!((rice.min, rice.max, rice.count), (1.0, 100.0, 5));
        assert_eq!(
            box_tooltip(rice),
            "Rice\nMedian: 3\nQ1: 2\nQ3: 4\nIQR: 2\nWhiskers: 1 - 7\nData points: 5"
        );
        assert_eq!(
            outlier_tooltip(&rice.commodity, rice.outliers[0]),
            "Rice\nOutlier: 100"
        );
        assert_eq!(outlier_tooltip("Diesel", 12345.6), "Diesel\nOutlier: 12,346");
    }

    #[test]
    fn invalid_rows_and_filters() {
        let coll = vec![
            obs("Rice", 10.0),
            obs("", 10.0),
            obs("Rice", 0.0),
            obs("Rice", -3.0),
            obs("diesel", 900.0),
            obs("Onions", 1200.0),
            obs("Onions", 1300.0),
        ];
        let all = boxes(compute_box_stats(&coll, CategoryFilter::All));
        let names: Vec<&str> = all.iter().map(|b| b.commodity.as_str()).collect();
        assert_eq!(names, vec!["diesel", "Onions", "Rice"]);
        assert_eq!(all[2].count, 1);
        assert_eq!(all[1].median, 1250.0);

        let fuel = boxes(compute_box_stats(
            &coll,
            CategoryFilter::Only(CommodityCategory::Fuel),
        ));
        assert_eq!(fuel.len(), 1);
        assert_eq!(fuel[0].category, CommodityCategory::Fuel);

        let only_invalid = vec![obs("Rice", 0.0), obs(" ", 5.0)];
        assert_eq!(
            compute_box_stats(&only_invalid, CategoryFilter::All),
            BoxPlotOutcome::NoData
        );
        assert_eq!(
            compute_box_stats(&coll[..1], CategoryFilter::Only(CommodityCategory::Fuel)),
            BoxPlotOutcome::NoData
        );
    }
}
