//! Segment profiling and persona labeling

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::error::{SegmentationError, SegmentationResult};
use crate::metrics::{CustomerMetrics, Feature};

/// Persona assigned to a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SegmentLabel {
    #[serde(rename = "High Value Explorer")]
    HighValueExplorer,
    #[serde(rename = "Brand Loyal VIP")]
    BrandLoyalVip,
    #[serde(rename = "Active Regular")]
    ActiveRegular,
    #[serde(rename = "New Customer")]
    NewCustomer,
    #[serde(rename = "Occasional Shopper")]
    OccasionalShopper,
}

impl SegmentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentLabel::HighValueExplorer => "High Value Explorer",
            SegmentLabel::BrandLoyalVip => "Brand Loyal VIP",
            SegmentLabel::ActiveRegular => "Active Regular",
            SegmentLabel::NewCustomer => "New Customer",
            SegmentLabel::OccasionalShopper => "Occasional Shopper",
        }
    }
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Descriptive statistics of one cluster, indexed by [`Feature`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentStats {
    pub segment: usize,
    pub size: usize,
    pub features: [FeatureStats; Feature::COUNT],
}

impl SegmentStats {
    pub fn get(&self, feature: Feature) -> FeatureStats {
        self.features[feature.index()]
    }

    pub fn mean(&self, feature: Feature) -> f64 {
        self.get(feature).mean
    }

    fn from_members(segment: usize, members: &[&CustomerMetrics]) -> Self {
        let features = Feature::ALL.map(|feature| {
            let (sum, min, max) = members.iter().map(|c| feature.value(c)).fold(
                (0.0, f64::INFINITY, f64::NEG_INFINITY),
                |(sum, min, max), v| (sum + v, min.min(v), max.max(v)),
            );
            FeatureStats {
                mean: sum / members.len() as f64,
                min,
                max,
            }
        });

        Self {
            segment,
            size: members.len(),
            features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentProfile {
    #[serde(flatten)]
    pub stats: SegmentStats,
    pub label: SegmentLabel,
}

impl SegmentProfile {
    pub fn segment(&self) -> usize {
        self.stats.segment
    }
}

/// Mean of the per-segment means; every segment is compared against this
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBaseline {
    pub total_spend: f64,
    pub brand_diversity: f64,
    pub recency: f64,
    pub frequency: f64,
}

impl SegmentBaseline {
    pub fn from_segments(segments: &[SegmentStats]) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let mean_of = |feature: Feature| {
            segments.iter().map(|s| s.mean(feature)).sum::<f64>() / segments.len() as f64
        };

        Some(Self {
            total_spend: mean_of(Feature::TotalSpend),
            brand_diversity: mean_of(Feature::BrandDiversity),
            recency: mean_of(Feature::Recency),
            frequency: mean_of(Feature::Frequency),
        })
    }
}

/// A single persona rule; rules are tried in order and the first match wins
pub struct LabelRule {
    pub label: SegmentLabel,
    pub matches: fn(&SegmentStats, &SegmentBaseline) -> bool,
}

fn high_spend(s: &SegmentStats, b: &SegmentBaseline) -> bool {
    s.mean(Feature::TotalSpend) > b.total_spend
}

fn high_spend_explorer(s: &SegmentStats, b: &SegmentBaseline) -> bool {
    high_spend(s, b) && s.mean(Feature::BrandDiversity) > b.brand_diversity
}

fn recent(s: &SegmentStats, b: &SegmentBaseline) -> bool {
    s.mean(Feature::Recency) < b.recency
}

fn recent_and_frequent(s: &SegmentStats, b: &SegmentBaseline) -> bool {
    recent(s, b) && s.mean(Feature::Frequency) > b.frequency
}

fn always(_: &SegmentStats, _: &SegmentBaseline) -> bool {
    true
}

pub const LABEL_RULES: [LabelRule; 5] = [
    LabelRule {
        label: SegmentLabel::HighValueExplorer,
        matches: high_spend_explorer,
    },
    LabelRule {
        label: SegmentLabel::BrandLoyalVip,
        matches: high_spend,
    },
    LabelRule {
        label: SegmentLabel::ActiveRegular,
        matches: recent_and_frequent,
    },
    LabelRule {
        label: SegmentLabel::NewCustomer,
        matches: recent,
    },
    LabelRule {
        label: SegmentLabel::OccasionalShopper,
        matches: always,
    },
];

pub fn label_for(stats: &SegmentStats, baseline: &SegmentBaseline) -> SegmentLabel {
    LABEL_RULES
        .iter()
        .find(|rule| (rule.matches)(stats, baseline))
        .map(|rule| rule.label)
        .unwrap_or(SegmentLabel::OccasionalShopper)
}

/// Per-segment mean/min/max of every clustering feature, ordered by segment id
pub fn describe_segments(customers: &[CustomerMetrics]) -> SegmentationResult<Vec<SegmentStats>> {
    let mut groups: BTreeMap<usize, Vec<&CustomerMetrics>> = BTreeMap::new();
    for customer in customers {
        let segment = customer
            .segment
            .ok_or_else(|| SegmentationError::UnassignedCustomer {
                customer_id: customer.customer_id.clone(),
            })?;
        groups.entry(segment).or_default().push(customer);
    }

    Ok(groups
        .into_iter()
        .map(|(segment, members)| SegmentStats::from_members(segment, &members))
        .collect())
}

/// Attach a persona to every segment
pub fn label_segments(segments: Vec<SegmentStats>) -> Vec<SegmentProfile> {
    let Some(baseline) = SegmentBaseline::from_segments(&segments) else {
        return Vec::new();
    };

    segments
        .into_iter()
        .map(|stats| {
            let label = label_for(&stats, &baseline);
            SegmentProfile { stats, label }
        })
        .collect()
}

pub fn profile_segments(customers: &[CustomerMetrics]) -> SegmentationResult<Vec<SegmentProfile>> {
    Ok(label_segments(describe_segments(customers)?))
}

/// Copy each segment's persona onto its member customers.
///
/// A customer whose segment has no profile is an integrity failure.
pub fn apply_labels(
    customers: Vec<CustomerMetrics>,
    profiles: &[SegmentProfile],
) -> SegmentationResult<Vec<CustomerMetrics>> {
    let labels: HashMap<usize, SegmentLabel> =
        profiles.iter().map(|p| (p.segment(), p.label)).collect();

    customers
        .into_iter()
        .map(|customer| {
            let segment = customer
                .segment
                .ok_or_else(|| SegmentationError::UnassignedCustomer {
                    customer_id: customer.customer_id.clone(),
                })?;
            let label = labels.get(&segment).copied().ok_or_else(|| {
                SegmentationError::MissingSegmentProfile {
                    customer_id: customer.customer_id.clone(),
                    segment,
                }
            })?;
            Ok(customer.with_label(label))
        })
        .collect()
}
