//! Tier catalog and progress arithmetic
//!
//! Tiers are qualified by yearly stays and show progress by points:
//!
//! | Tier        | Stays / year | Multiplier | Point threshold |
//! |-------------|--------------|------------|-----------------|
//! | Explorer    | 0-2          | 1x         | 0               |
//! | Voyager     | 3-5          | 1.25x      | 10,000          |
//! | Adventurer  | 6-9          | 1.5x       | 25,750          |
//! | Connoisseur | 10+          | 2x         | 50,000          |

use super::types::{MembershipTier, TierLevel};

/// Base earn rate before the tier multiplier is applied
pub const BASE_POINTS_PER_UNIT: i64 = 10;

impl TierLevel {
    /// Get all tiers, lowest first
    pub fn all() -> &'static [TierLevel] {
        &[
            TierLevel::Explorer,
            TierLevel::Voyager,
            TierLevel::Adventurer,
            TierLevel::Connoisseur,
        ]
    }

    /// Tier whose qualification range contains the yearly stay count
    pub fn for_stays(stays: u32) -> TierLevel {
        match stays {
            0..=2 => TierLevel::Explorer,
            3..=5 => TierLevel::Voyager,
            6..=9 => TierLevel::Adventurer,
            _ => TierLevel::Connoisseur,
        }
    }

    /// The following tier, or `None` at the top
    pub fn next(&self) -> Option<TierLevel> {
        match self {
            TierLevel::Explorer => Some(TierLevel::Voyager),
            TierLevel::Voyager => Some(TierLevel::Adventurer),
            TierLevel::Adventurer => Some(TierLevel::Connoisseur),
            TierLevel::Connoisseur => None,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            TierLevel::Explorer => 1.0,
            TierLevel::Voyager => 1.25,
            TierLevel::Adventurer => 1.5,
            TierLevel::Connoisseur => 2.0,
        }
    }

    /// Point balance at which this tier's progress bar is full
    pub fn point_threshold(&self) -> i64 {
        match self {
            TierLevel::Explorer => 0,
            TierLevel::Voyager => 10_000,
            TierLevel::Adventurer => 25_750,
            TierLevel::Connoisseur => 50_000,
        }
    }

    /// Build the full display record for this tier
    pub fn tier(&self) -> MembershipTier {
        let (description, qualification, features, perks, color): (
            &str,
            &str,
            &[&str],
            &[&str],
            &str,
        ) = match self {
            TierLevel::Explorer => (
                "Perfect for first-time and occasional guests",
                "0-2 stays per year",
                &[
                    "Earn 10 points per $1 spent",
                    "Member-exclusive rates",
                    "Digital membership card",
                    "Free Wi-Fi",
                    "Late check-out upon availability",
                ],
                &[],
                "bg-gradient-to-r from-slate-500 to-slate-600",
            ),
            TierLevel::Voyager => (
                "For regular guests who choose Kuriftu",
                "3-5 stays per year",
                &[
                    "Earn 12.5 points per $1 spent",
                    "All Explorer benefits",
                    "Room upgrade upon availability",
                    "Early check-in upon availability",
                    "Welcome amenity",
                    "Dedicated reservations line",
                ],
                &["Complimentary breakfast for two"],
                "bg-gradient-to-r from-amber-500 to-amber-600",
            ),
            TierLevel::Adventurer => (
                "For frequent guests who love Kuriftu",
                "6-9 stays per year",
                &[
                    "Earn 15 points per $1 spent",
                    "All Voyager benefits",
                    "Guaranteed room upgrade",
                    "Guaranteed late check-out (2pm)",
                    "Spa treatment discount (15%)",
                    "Dining discount (15%)",
                ],
                &["Annual free night certificate", "Exclusive seasonal offers"],
                "bg-gradient-to-r from-emerald-500 to-emerald-600",
            ),
            TierLevel::Connoisseur => (
                "Our highest tier for our most loyal guests",
                "10+ stays per year",
                &[
                    "Earn 20 points per $1 spent",
                    "All Adventurer benefits",
                    "Guaranteed suite upgrade",
                    "Guaranteed late check-out (4pm)",
                    "Spa treatment discount (25%)",
                    "Dining discount (25%)",
                    "Airport transfers",
                    "Personal concierge",
                ],
                &[
                    "Annual 2-night free stay",
                    "Exclusive access to member events",
                    "Personalized welcome amenities",
                    "Priority access to new experiences",
                ],
                "bg-gradient-to-r from-purple-500 to-purple-600",
            ),
        };

        MembershipTier {
            level: *self,
            name: self.to_string(),
            description: description.to_string(),
            qualification: qualification.to_string(),
            points_multiplier: format!("{}x", self.multiplier()),
            features: features.iter().map(|s| s.to_string()).collect(),
            special_perks: perks.iter().map(|s| s.to_string()).collect(),
            color: color.to_string(),
            text_color: "text-white".to_string(),
            featured: *self == TierLevel::Adventurer,
        }
    }

    /// Stay upgrades granted at booking time
    pub fn stay_upgrades(&self) -> Vec<String> {
        let upgrades: &[&str] = match self {
            TierLevel::Explorer => &["Late checkout upon availability"],
            TierLevel::Voyager => &["Room upgrade upon availability", "Welcome amenity"],
            TierLevel::Adventurer => &["Guaranteed room upgrade", "Late checkout (2pm)"],
            TierLevel::Connoisseur => &[
                "Guaranteed suite upgrade",
                "Late checkout (4pm)",
                "Airport transfers",
            ],
        };
        upgrades.iter().map(|s| s.to_string()).collect()
    }
}

/// All tiers as display records, lowest first
pub fn catalog() -> Vec<MembershipTier> {
    TierLevel::all().iter().map(TierLevel::tier).collect()
}

/// Percentage of the way from the current balance to the next tier.
///
/// `min(100, points / (points + points_to_next) * 100)`, clamped to [0, 100].
/// `None` means there is no next tier and yields 100, as does a zero
/// denominator.
pub fn progress_percentage(points: i64, points_to_next: Option<i64>) -> f64 {
    let Some(remaining) = points_to_next else {
        return 100.0;
    };

    let denominator = points as f64 + remaining as f64;
    if denominator == 0.0 {
        return 100.0;
    }

    (points as f64 / denominator * 100.0).min(100.0).clamp(0.0, 100.0)
}

/// Points still needed to reach `next`, floored at zero
pub fn points_to_next_tier(points: i64, next: Option<TierLevel>) -> Option<i64> {
    next.map(|tier| (tier.point_threshold() - points).max(0))
}

/// Points earned for a spend in cents at the given tier, rounded down
pub fn points_for_spend(tier: TierLevel, amount_cents: i64) -> i64 {
    if amount_cents <= 0 {
        return 0;
    }
    let base = amount_cents as f64 * BASE_POINTS_PER_UNIT as f64 / 100.0;
    (base * tier.multiplier()).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_for_stays() {
        assert_eq!(TierLevel::for_stays(0), TierLevel::Explorer);
        assert_eq!(TierLevel::for_stays(2), TierLevel::Explorer);
        assert_eq!(TierLevel::for_stays(3), TierLevel::Voyager);
        assert_eq!(TierLevel::for_stays(5), TierLevel::Voyager);
        assert_eq!(TierLevel::for_stays(6), TierLevel::Adventurer);
        assert_eq!(TierLevel::for_stays(9), TierLevel::Adventurer);
        assert_eq!(TierLevel::for_stays(10), TierLevel::Connoisseur);
        assert_eq!(TierLevel::for_stays(250), TierLevel::Connoisseur);
    }

    #[test]
    fn test_next_tier_chain() {
        assert_eq!(TierLevel::Explorer.next(), Some(TierLevel::Voyager));
        assert_eq!(TierLevel::Connoisseur.next(), None);
    }

    #[test]
    fn test_catalog_labels() {
        let tiers = catalog();
        assert_eq!(tiers.len(), 4);
        let labels: Vec<&str> = tiers.iter().map(|t| t.points_multiplier.as_str()).collect();
        assert_eq!(labels, vec!["1x", "1.25x", "1.5x", "2x"]);
        assert!(tiers[2].featured);
        assert!(tiers[0].special_perks.is_empty());
        assert_eq!(tiers[3].special_perks.len(), 4);
    }

    #[test]
    fn test_progress_matches_formula() {
        // Voyager with 15,750 points and 10,000 to go
        let pct = progress_percentage(15_750, Some(10_000));
        assert!((pct - 61.165).abs() < 0.01);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress_percentage(5_000, None), 100.0);
        assert_eq!(progress_percentage(0, Some(0)), 100.0);
        assert_eq!(progress_percentage(0, Some(10_000)), 0.0);
        assert_eq!(progress_percentage(-500, Some(1_000)), 0.0);
        assert_eq!(progress_percentage(500, Some(-1_000)), 0.0);
        assert_eq!(progress_percentage(2_000, Some(-500)), 100.0);

        for points in [-10_000, -1, 0, 1, 999, 50_000] {
            for remaining in [-10_000, -1, 0, 1, 999, 50_000] {
                let pct = progress_percentage(points, Some(remaining));
                assert!((0.0..=100.0).contains(&pct), "{points}/{remaining} -> {pct}");
            }
        }
    }

    #[test]
    fn test_points_to_next_tier() {
        assert_eq!(
            points_to_next_tier(15_750, Some(TierLevel::Adventurer)),
            Some(10_000)
        );
        assert_eq!(points_to_next_tier(60_000, Some(TierLevel::Connoisseur)), Some(0));
        assert_eq!(points_to_next_tier(60_000, None), None);
    }

    #[test]
    fn test_points_for_spend() {
        // $500 at 1.25x = 500 * 12.5
        assert_eq!(points_for_spend(TierLevel::Voyager, 50_000), 6_250);
        assert_eq!(points_for_spend(TierLevel::Explorer, 12_345), 1_234);
        assert_eq!(points_for_spend(TierLevel::Connoisseur, 100), 20);
        assert_eq!(points_for_spend(TierLevel::Adventurer, 0), 0);
        assert_eq!(points_for_spend(TierLevel::Adventurer, -100), 0);
    }
}
