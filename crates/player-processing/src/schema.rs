//! Fixed column schema of the player dataset.

pub const NAME: &str = "Name";
pub const AGE: &str = "Age";
pub const NATIONALITY: &str = "Nationality";
pub const OVERALL: &str = "Overall";
pub const POTENTIAL: &str = "Potential";
pub const INTERNATIONAL_REPUTATION: &str = "International Reputation";
pub const CLUB: &str = "Club";
pub const WAGE: &str = "Wage";
pub const PREFERRED_FOOT: &str = "Preferred Foot";
pub const WEAK_FOOT: &str = "Weak Foot";
pub const POSITION: &str = "Position";
pub const JERSEY_NUMBER: &str = "Jersey Number";
pub const HEIGHT: &str = "Height";
pub const WEIGHT: &str = "Weight";
pub const JOINED: &str = "Joined";
pub const CONTRACT_VALID_UNTIL: &str = "Contract Valid Until";
pub const RELEASE_CLAUSE: &str = "Release Clause";

/// Derived coarse position, placed right after [`POSITION`].
pub const POSITION_GROUP: &str = "Position_Group";

/// The 17 selected columns, in canonical order.
pub const SELECTED_COLUMNS: [&str; 17] = [
    NAME,
    AGE,
    NATIONALITY,
    OVERALL,
    POTENTIAL,
    INTERNATIONAL_REPUTATION,
    CLUB,
    WAGE,
    PREFERRED_FOOT,
    WEAK_FOOT,
    POSITION,
    JERSEY_NUMBER,
    HEIGHT,
    WEIGHT,
    JOINED,
    CONTRACT_VALID_UNTIL,
    RELEASE_CLAUSE,
];

/// Rows missing any of these are dropped rather than filled.
pub const KEY_COLUMNS: [&str; 4] = [NAME, OVERALL, POTENTIAL, POSITION];

/// Columns truncated to integers after imputation.
pub const INTEGRAL_COLUMNS: [&str; 3] = [INTERNATIONAL_REPUTATION, WEAK_FOOT, JERSEY_NUMBER];

/// Currency columns parsed from shorthand like `€10.5M`.
pub const CURRENCY_COLUMNS: [&str; 2] = [WAGE, RELEASE_CLAUSE];

pub const WAGE_LABEL: &str = "Wage (K_EUR)";
pub const RELEASE_CLAUSE_LABEL: &str = "Release Clause (M_EUR)";
pub const HEIGHT_LABEL: &str = "Height_cm";
pub const WEIGHT_LABEL: &str = "Weight_kg";

/// Presentation renames applied by the scaler, `(from, to)`.
pub const PRESENTATION_LABELS: [(&str, &str); 4] = [
    (WAGE, WAGE_LABEL),
    (RELEASE_CLAUSE, RELEASE_CLAUSE_LABEL),
    (HEIGHT, HEIGHT_LABEL),
    (WEIGHT, WEIGHT_LABEL),
];
