use anyhow::{bail, Result};
use axum::Json;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;

/// Purchasable credit bundle. Fixed at deploy time; both order creation and
/// settlement read prices from here so the two can never drift.
#[derive(Serialize, Clone)]
pub struct CreditPackage {
    pub id: &'static str,
    pub name: &'static str,
    pub credits: i32,
    /// Price in minor units (paise).
    pub amount_minor: i64,
    pub currency: &'static str,
}

static PACKAGES: Lazy<Vec<CreditPackage>> = Lazy::new(|| vec![
    CreditPackage { id: "starter", name: "Starter Pack", credits: 10, amount_minor: 24900, currency: "INR" },
    CreditPackage { id: "professional", name: "Professional Pack", credits: 25, amount_minor: 49900, currency: "INR" },
    CreditPackage { id: "enterprise", name: "Enterprise Pack", credits: 50, amount_minor: 89900, currency: "INR" },
]);

pub fn packages() -> &'static [CreditPackage] {
    &PACKAGES
}

pub fn find(package_id: &str) -> Option<&'static CreditPackage> {
    PACKAGES.iter().find(|p| p.id == package_id)
}

/// Maps a paid amount back to its package. Total over the configured price
/// set; anything else is `None` and the settlement must reject, never grant
/// zero credits.
pub fn package_for_amount(amount_minor: i64, currency: &str) -> Option<&'static CreditPackage> {
    PACKAGES
        .iter()
        .find(|p| p.amount_minor == amount_minor && p.currency == currency)
}

/// Startup sanity check: ids unique, prices unique and positive. A duplicate
/// price would make the amount-to-credits mapping ambiguous.
pub fn validate() -> Result<()> {
    if PACKAGES.is_empty() {
        bail!("credit package catalog is empty");
    }
    let mut ids = HashSet::new();
    let mut prices = HashSet::new();
    for package in PACKAGES.iter() {
        if package.credits <= 0 {
            bail!("package '{}' grants no credits", package.id);
        }
        if package.amount_minor <= 0 {
            bail!("package '{}' has a non-positive price", package.id);
        }
        if !ids.insert(package.id) {
            bail!("duplicate package id '{}'", package.id);
        }
        if !prices.insert((package.amount_minor, package.currency)) {
            bail!(
                "duplicate price {} {} in catalog",
                package.amount_minor,
                package.currency
            );
        }
    }
    Ok(())
}

pub async fn list_packages() -> Json<Vec<CreditPackage>> {
    Json(PACKAGES.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_valid() {
        validate().unwrap();
    }

    #[test]
    fn amounts_map_to_configured_credits() {
        assert_eq!(package_for_amount(24900, "INR").unwrap().credits, 10);
        assert_eq!(package_for_amount(49900, "INR").unwrap().credits, 25);
        assert_eq!(package_for_amount(89900, "INR").unwrap().credits, 50);
    }

    #[test]
    fn unknown_amount_has_no_package() {
        assert!(package_for_amount(99900, "INR").is_none());
        assert!(package_for_amount(0, "INR").is_none());
        assert!(package_for_amount(49900, "USD").is_none());
    }

    #[test]
    fn package_lookup_by_id() {
        assert_eq!(find("professional").unwrap().amount_minor, 49900);
        assert!(find("platinum").is_none());
    }
}
