//! Payment method wallet
//!
//! A wallet keeps exactly one default card whenever it is non-empty.

use chrono::{Datelike, NaiveDate};

use super::error::{LoyaltyError, LoyaltyResult};
use super::types::PaymentMethod;

impl PaymentMethod {
    /// Masked label, e.g. "Visa •••• 4242"
    pub fn display_label(&self) -> String {
        format!("{} •••• {}", self.card_brand, self.last_four)
    }

    /// A card is usable through the last day of its expiry month
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        (self.expiry_year, self.expiry_month) < (today.year(), today.month())
    }

    /// Check field shapes
    pub fn validate(&self) -> LoyaltyResult<()> {
        if self.last_four.len() != 4 || !self.last_four.chars().all(|c| c.is_ascii_digit()) {
            return Err(LoyaltyError::InvalidPaymentMethod(
                "last four must be exactly four digits".to_string(),
            ));
        }
        if !(1..=12).contains(&self.expiry_month) {
            return Err(LoyaltyError::InvalidPaymentMethod(format!(
                "expiry month {} is out of range",
                self.expiry_month
            )));
        }
        if !(2000..=2100).contains(&self.expiry_year) {
            return Err(LoyaltyError::InvalidPaymentMethod(format!(
                "expiry year {} is out of range",
                self.expiry_year
            )));
        }
        if self.cardholder_name.trim().is_empty() {
            return Err(LoyaltyError::InvalidPaymentMethod(
                "cardholder name is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A member's stored payment methods
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    methods: Vec<PaymentMethod>,
}

impl Wallet {
    /// Build a wallet from stored methods, repairing the default flag if needed
    pub fn from_methods(methods: Vec<PaymentMethod>) -> Self {
        let mut wallet = Self { methods };
        wallet.normalize_default();
        wallet
    }

    pub fn methods(&self) -> &[PaymentMethod] {
        &self.methods
    }

    pub fn into_methods(self) -> Vec<PaymentMethod> {
        self.methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.id == id)
    }

    pub fn default_method(&self) -> Option<&PaymentMethod> {
        self.methods.iter().find(|m| m.is_default)
    }

    /// Add a method. The first method, or one flagged default, becomes the default.
    pub fn add(&mut self, method: PaymentMethod) -> LoyaltyResult<()> {
        method.validate()?;
        if self.get(&method.id).is_some() {
            return Err(LoyaltyError::InvalidPaymentMethod(format!(
                "duplicate id {}",
                method.id
            )));
        }

        let make_default = method.is_default || self.methods.is_empty();
        let id = method.id.clone();
        self.methods.push(method);

        if make_default {
            self.set_default(&id)?;
        } else if let Some(last) = self.methods.last_mut() {
            last.is_default = false;
        }
        Ok(())
    }

    /// Mark `id` as the only default
    pub fn set_default(&mut self, id: &str) -> LoyaltyResult<()> {
        if self.get(id).is_none() {
            return Err(LoyaltyError::PaymentMethodNotFound(id.to_string()));
        }
        for method in &mut self.methods {
            method.is_default = method.id == id;
        }
        Ok(())
    }

    /// Remove `id`; if it was the default, the first remaining method takes over
    pub fn remove(&mut self, id: &str) -> LoyaltyResult<PaymentMethod> {
        let index = self
            .methods
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| LoyaltyError::PaymentMethodNotFound(id.to_string()))?;

        let removed = self.methods.remove(index);
        if removed.is_default {
            if let Some(first) = self.methods.first_mut() {
                first.is_default = true;
            }
        }
        Ok(removed)
    }

    fn normalize_default(&mut self) {
        let mut seen = false;
        for method in &mut self.methods {
            if method.is_default && !seen {
                seen = true;
            } else {
                method.is_default = false;
            }
        }
        if !seen {
            if let Some(first) = self.methods.first_mut() {
                first.is_default = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loyalty::types::{BillingAddress, CardBrand, CardKind};

    fn card(id: &str, brand: CardBrand, last_four: &str, is_default: bool) -> PaymentMethod {
        PaymentMethod {
            id: id.to_string(),
            kind: CardKind::Credit,
            card_brand: brand,
            last_four: last_four.to_string(),
            expiry_month: 12,
            expiry_year: 2025,
            cardholder_name: "John Doe".to_string(),
            is_default,
            billing_address: BillingAddress {
                line1: "123 Main St".to_string(),
                line2: None,
                city: "Anytown".to_string(),
                state: "CA".to_string(),
                postal_code: "12345".to_string(),
                country: "United States".to_string(),
            },
        }
    }

    fn default_count(wallet: &Wallet) -> usize {
        wallet.methods().iter().filter(|m| m.is_default).count()
    }

    #[test]
    fn test_display_label() {
        assert_eq!(card("c", CardBrand::Visa, "4242", true).display_label(), "Visa •••• 4242");
        assert_eq!(
            card("c", CardBrand::Mastercard, "5678", true).display_label(),
            "Mastercard •••• 5678"
        );
    }

    #[test]
    fn test_expiry() {
        let c = card("c", CardBrand::Visa, "4242", true);
        assert!(!c.is_expired(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
        assert!(c.is_expired(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }

    #[test]
    fn test_validation() {
        assert!(card("c", CardBrand::Visa, "424", true).validate().is_err());
        assert!(card("c", CardBrand::Visa, "42a2", true).validate().is_err());

        let mut bad_month = card("c", CardBrand::Visa, "4242", true);
        bad_month.expiry_month = 13;
        assert!(bad_month.validate().is_err());
    }

    #[test]
    fn test_first_card_becomes_default() {
        let mut wallet = Wallet::default();
        wallet.add(card("card-1", CardBrand::Visa, "4242", false)).unwrap();
        assert_eq!(wallet.default_method().unwrap().id, "card-1");

        wallet.add(card("card-2", CardBrand::Mastercard, "5678", false)).unwrap();
        assert_eq!(wallet.default_method().unwrap().id, "card-1");

        wallet.add(card("card-3", CardBrand::Amex, "0005", true)).unwrap();
        assert_eq!(wallet.default_method().unwrap().id, "card-3");
        assert_eq!(default_count(&wallet), 1);

        assert!(wallet.add(card("card-3", CardBrand::Amex, "0005", false)).is_err());
    }

    #[test]
    fn test_set_default_is_exclusive() {
        let mut wallet = Wallet::from_methods(vec![
            card("card-1", CardBrand::Visa, "4242", true),
            card("card-2", CardBrand::Mastercard, "5678", false),
        ]);

        wallet.set_default("card-2").unwrap();
        assert_eq!(wallet.default_method().unwrap().id, "card-2");
        assert_eq!(default_count(&wallet), 1);

        assert!(matches!(
            wallet.set_default("card-9"),
            Err(LoyaltyError::PaymentMethodNotFound(_))
        ));
    }

    #[test]
    fn test_remove_default_promotes_first() {
        let mut wallet = Wallet::from_methods(vec![
            card("card-1", CardBrand::Visa, "4242", true),
            card("card-2", CardBrand::Mastercard, "5678", false),
        ]);

        let removed = wallet.remove("card-1").unwrap();
        assert_eq!(removed.id, "card-1");
        assert_eq!(wallet.default_method().unwrap().id, "card-2");

        wallet.remove("card-2").unwrap();
        assert!(wallet.is_empty());
        assert!(wallet.default_method().is_none());
    }

    #[test]
    fn test_from_methods_repairs_defaults() {
        let wallet = Wallet::from_methods(vec![
            card("card-1", CardBrand::Visa, "4242", true),
            card("card-2", CardBrand::Mastercard, "5678", true),
        ]);
        assert_eq!(default_count(&wallet), 1);
        assert_eq!(wallet.default_method().unwrap().id, "card-1");

        let wallet = Wallet::from_methods(vec![card("card-2", CardBrand::Visa, "5678", false)]);
        assert_eq!(wallet.default_method().unwrap().id, "card-2");
    }
}
