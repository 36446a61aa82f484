//! Rewards portal service
//!
//! Ties the loyalty rules to stored member data. Every method takes the
//! member's id and, where dates matter, an explicit `today` so results are
//! reproducible.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::error::{RewardsError, RewardsResult};
use super::stays::{points_for_cost, room_label, StayConfirmation, StayRequest};
use crate::forms::Registration;
use crate::loyalty::bookings::{cancel, confirmation_number};
use crate::loyalty::ledger::{sort_newest_first, to_csv};
use crate::loyalty::{
    points_for_spend, points_to_next_tier, progress_percentage, seed, Booking, BookingFilter,
    BookingStatus, BookingViews, LedgerFilter, LedgerSummary, LoyaltyError, Membership,
    PaymentMethod, PaymentStatus, PaymentTransaction, PointTransaction, Preferences,
    Recommendations, TierLevel, Wallet,
};
use crate::store::{Redemption, Store, UserProfile};

/// Filtered ledger slice with its totals
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointHistory {
    pub transactions: Vec<PointTransaction>,
    pub summary: LedgerSummary,
    /// Balance over the full ledger, independent of the filter
    pub balance: i64,
}

/// Record counts written by [`RewardsService::seed_demo_member`]
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SeedSummary {
    pub bookings: usize,
    pub transactions: usize,
    pub payment_methods: usize,
    pub payment_transactions: usize,
}

pub struct RewardsService {
    store: Arc<Store>,
}

impl RewardsService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Past stays that ended within the trailing year
    pub fn stays_this_year(&self, user_id: &str, today: NaiveDate) -> RewardsResult<u32> {
        let since = today - Duration::days(365);
        let stays = self
            .store
            .bookings(user_id)?
            .iter()
            .filter(|b| b.status == BookingStatus::Past)
            .filter(|b| b.check_out > since && b.check_out <= today)
            .count();
        Ok(stays as u32)
    }

    pub fn balance(&self, user_id: &str) -> RewardsResult<i64> {
        Ok(self.store.balance(user_id)?)
    }

    /// Current tier, balance, and progress toward the next tier
    pub fn user_membership(&self, user: &UserProfile, today: NaiveDate) -> RewardsResult<Membership> {
        let stays = self.stays_this_year(&user.id, today)?;
        let level = TierLevel::for_stays(stays);
        let next = level.next();
        let points = self.balance(&user.id)?;
        let points_to_next = points_to_next_tier(points, next);

        Ok(Membership {
            tier: level.tier(),
            points,
            next_tier: next.map(|t| t.tier()),
            points_to_next_tier: points_to_next,
            member_since: user.created_at.date_naive(),
            progress_percentage: progress_percentage(points, points_to_next),
            stays_this_year: stays,
        })
    }

    /// Experience catalog plus offers still valid on `today`
    pub fn recommendations(&self, today: NaiveDate) -> Recommendations {
        Recommendations {
            experiences: seed::experiences(),
            offers: seed::offers(today)
                .into_iter()
                .filter(|o| o.valid_until >= today)
                .collect(),
        }
    }

    /// Book an upcoming stay
    ///
    /// Paying with points redeems the whole cost and earns nothing; paying
    /// by card earns points at the member's tier multiplier.
    pub fn book_stay(
        &self,
        user_id: &str,
        request: &StayRequest,
        today: NaiveDate,
    ) -> RewardsResult<StayConfirmation> {
        let (location, total_cost_cents) = request.validate(today)?;
        let tier = TierLevel::for_stays(self.stays_this_year(user_id, today)?);

        let (points_earned, points_redeemed) = if request.use_points {
            (0, points_for_cost(total_cost_cents))
        } else {
            (points_for_spend(tier, total_cost_cents), 0)
        };

        let booking = Booking {
            id: format!("booking-{}", Uuid::new_v4().simple()),
            hotel: request.hotel.clone(),
            location: location.to_string(),
            check_in: request.check_in,
            check_out: request.check_out,
            room_type: room_label(&request.room_type).to_string(),
            guests: request.guests_label(),
            status: BookingStatus::Upcoming,
            confirmation_number: confirmation_number(),
            price_cents: Some(total_cost_cents),
            points_earned: Some(points_earned),
            points_redeemed: request.use_points.then_some(points_redeemed),
            image: None,
        };

        if request.use_points {
            let redemption = PointTransaction::redeem(
                new_tx_id(),
                today,
                format!("Stay Redemption - {}", booking.hotel),
                points_redeemed,
            );
            if let Redemption::Insufficient { available } =
                self.store.book_with_points(user_id, &booking, &redemption)?
            {
                return Err(LoyaltyError::InsufficientPoints {
                    needed: points_redeemed,
                    available,
                }
                .into());
            }
        } else {
            self.store.put_booking(user_id, &booking)?;
            if points_earned > 0 {
                self.store.put_transaction(
                    user_id,
                    &PointTransaction::earn(
                        new_tx_id(),
                        today,
                        format!("Stay at {}", booking.hotel),
                        points_earned,
                    ),
                )?;
            }
            self.charge_default_card(user_id, &booking, total_cost_cents, today)?;
        }

        tracing::info!(
            user_id,
            booking_id = %booking.id,
            tier = %tier,
            points_earned,
            points_redeemed,
            "Stay booked"
        );

        Ok(StayConfirmation {
            booking_id: booking.id,
            confirmation_number: booking.confirmation_number,
            points_earned,
            points_redeemed,
            total_cost_cents,
            upgrades: tier.stay_upgrades(),
        })
    }

    /// Without a card on file the stay is paid at the resort
    fn charge_default_card(
        &self,
        user_id: &str,
        booking: &Booking,
        amount_cents: i64,
        today: NaiveDate,
    ) -> RewardsResult<()> {
        let wallet = Wallet::from_methods(self.store.payment_methods(user_id)?);
        let Some(card) = wallet.default_method() else {
            return Ok(());
        };
        self.store.put_payment_transaction(
            user_id,
            &PaymentTransaction {
                id: charge_id(&booking.id),
                date: today,
                description: format!("{} - Room Charge", booking.hotel),
                amount_cents,
                status: PaymentStatus::Pending,
                payment_method: card.display_label(),
            },
        )?;
        Ok(())
    }

    pub fn point_history(&self, user_id: &str, filter: &LedgerFilter) -> RewardsResult<PointHistory> {
        let mut all = self.store.transactions(user_id)?;
        sort_newest_first(&mut all);
        let balance = LedgerSummary::from_transactions(&all).balance;
        let transactions = filter.apply(&all);
        let summary = LedgerSummary::from_transactions(&transactions);
        Ok(PointHistory {
            transactions,
            summary,
            balance,
        })
    }

    /// Filtered ledger as CSV
    pub fn export_points(&self, user_id: &str, filter: &LedgerFilter) -> RewardsResult<String> {
        let history = self.point_history(user_id, filter)?;
        Ok(to_csv(&history.transactions)?)
    }

    pub fn bookings(&self, user_id: &str, filter: &BookingFilter) -> RewardsResult<BookingViews> {
        let bookings = self.store.bookings(user_id)?;
        Ok(BookingViews::partition(filter.apply(&bookings)))
    }

    /// Cancel an upcoming stay
    ///
    /// Points the stay earned are reversed, points spent on it are refunded,
    /// and a pending room charge is marked failed.
    pub fn cancel_booking(
        &self,
        user_id: &str,
        booking_id: &str,
        today: NaiveDate,
    ) -> RewardsResult<Booking> {
        let mut booking = self
            .store
            .booking(user_id, booking_id)?
            .ok_or_else(|| RewardsError::BookingNotFound(booking_id.to_string()))?;

        cancel(&mut booking)?;

        let mut ledger = Vec::new();
        if let Some(points) = booking.points_earned.filter(|p| *p > 0) {
            ledger.push(PointTransaction::redeem(
                new_tx_id(),
                today,
                format!("Cancelled stay - {}", booking.hotel),
                points,
            ));
        }
        if let Some(points) = booking.points_redeemed.filter(|p| *p > 0) {
            ledger.push(PointTransaction::earn(
                new_tx_id(),
                today,
                format!("Refund - {}", booking.hotel),
                points,
            ));
        }

        let charge = self
            .store
            .payment_transaction(user_id, &charge_id(&booking.id))?
            .filter(|c| c.status == PaymentStatus::Pending)
            .map(|mut c| {
                c.status = PaymentStatus::Failed;
                c
            });

        if !self
            .store
            .commit_cancellation(user_id, &booking, &ledger, charge.as_ref())?
        {
            return Err(LoyaltyError::NotCancellable {
                id: booking.id,
                status: BookingStatus::Cancelled,
            }
            .into());
        }

        tracing::info!(
            user_id,
            booking_id,
            adjustments = ledger.len(),
            charge_voided = charge.is_some(),
            "Booking cancelled"
        );
        Ok(booking)
    }

    pub fn payment_methods(&self, user_id: &str) -> RewardsResult<Vec<PaymentMethod>> {
        Ok(Wallet::from_methods(self.store.payment_methods(user_id)?).into_methods())
    }

    pub fn add_payment_method(
        &self,
        user_id: &str,
        method: PaymentMethod,
    ) -> RewardsResult<Vec<PaymentMethod>> {
        self.update_wallet(user_id, |wallet| wallet.add(method))
    }

    pub fn set_default_payment_method(
        &self,
        user_id: &str,
        id: &str,
    ) -> RewardsResult<Vec<PaymentMethod>> {
        self.update_wallet(user_id, |wallet| wallet.set_default(id))
    }

    pub fn remove_payment_method(&self, user_id: &str, id: &str) -> RewardsResult<Vec<PaymentMethod>> {
        self.update_wallet(user_id, |wallet| wallet.remove(id).map(|_| ()))
    }

    fn update_wallet<F>(&self, user_id: &str, change: F) -> RewardsResult<Vec<PaymentMethod>>
    where
        F: FnOnce(&mut Wallet) -> Result<(), LoyaltyError>,
    {
        let mut wallet = Wallet::from_methods(self.store.payment_methods(user_id)?);
        change(&mut wallet)?;
        self.store.replace_payment_methods(user_id, wallet.methods())?;
        Ok(wallet.into_methods())
    }

    pub fn payment_transactions(&self, user_id: &str) -> RewardsResult<Vec<PaymentTransaction>> {
        Ok(self.store.payment_transactions(user_id)?)
    }

    /// Stored settings, or the defaults for a member who never saved any
    pub fn preferences(&self, user_id: &str) -> RewardsResult<Preferences> {
        Ok(self.store.preferences(user_id)?.unwrap_or_default())
    }

    pub fn update_preferences(&self, user_id: &str, prefs: &Preferences) -> RewardsResult<()> {
        prefs.validate()?;
        self.store.put_preferences(user_id, prefs)?;
        Ok(())
    }

    /// Validate a registration form and write it to its collection
    ///
    /// Returns the new document id.
    pub fn submit_registration(
        &self,
        registration: &Registration,
        user: Option<&UserProfile>,
    ) -> RewardsResult<String> {
        registration.validate()?;

        let mut document = registration.to_document();
        if let (Some(user), Some(fields)) = (user, document.as_object_mut()) {
            fields.insert("userId".to_string(), serde_json::Value::String(user.id.clone()));
        }

        let kind = registration.kind();
        let id = self.store.add_registration(kind.collection(), &document)?;
        tracing::info!(kind = %kind, id = %id, "Registration submitted");
        Ok(id)
    }

    /// Load the portal's demo records for a member
    pub fn seed_demo_member(&self, user_id: &str, today: NaiveDate) -> RewardsResult<SeedSummary> {
        let bookings = seed::bookings(today);
        let transactions = seed::point_history(today);
        let methods = seed::payment_methods(today);
        let payments = seed::payment_transactions(today);

        for booking in &bookings {
            self.store.put_booking(user_id, booking)?;
        }
        for tx in &transactions {
            self.store.put_transaction(user_id, tx)?;
        }
        self.store.replace_payment_methods(user_id, &methods)?;
        for payment in &payments {
            self.store.put_payment_transaction(user_id, payment)?;
        }

        let summary = SeedSummary {
            bookings: bookings.len(),
            transactions: transactions.len(),
            payment_methods: methods.len(),
            payment_transactions: payments.len(),
        };
        tracing::info!(user_id, ?summary, "Seeded demo member");
        Ok(summary)
    }
}

fn new_tx_id() -> String {
    format!("tx-{}", Uuid::new_v4().simple())
}

/// Room charge recorded for a card-paid booking
fn charge_id(booking_id: &str) -> String {
    format!("pay-{}", booking_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{DateRange, DiningRegistration, RegistrationKind};
    use crate::loyalty::{BillingAddress, CardBrand, CardKind, DateWindow, TypeFilter};
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn member() -> UserProfile {
        UserProfile {
            id: "user-1".to_string(),
            full_name: "John Doe".to_string(),
            age: 40,
            email: "john@example.com".to_string(),
            created_at: Utc.with_ymd_and_hms(2022, 1, 15, 9, 0, 0).unwrap(),
        }
    }

    fn seeded() -> RewardsService {
        let service = RewardsService::new(Arc::new(Store::in_memory().unwrap()));
        service.seed_demo_member("user-1", today()).unwrap();
        service
    }

    fn stay(use_points: bool) -> StayRequest {
        StayRequest {
            hotel: "Kuriftu Resort Bahir Dar".to_string(),
            check_in: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
            room_type: "deluxe".to_string(),
            guests: 2,
            use_points,
        }
    }

    #[test]
    fn test_demo_membership() {
        let service = seeded();
        let membership = service.user_membership(&member(), today()).unwrap();

        assert_eq!(membership.stays_this_year, 3);
        assert_eq!(membership.tier.level, TierLevel::Voyager);
        assert_eq!(membership.points, 15_750);
        assert_eq!(membership.points_to_next_tier, Some(10_000));
        assert_eq!(
            membership.next_tier.map(|t| t.level),
            Some(TierLevel::Adventurer)
        );
        assert!((membership.progress_percentage - 61.165).abs() < 0.01);
        assert_eq!(membership.member_since, NaiveDate::from_ymd_opt(2022, 1, 15).unwrap());
    }

    #[test]
    fn test_new_member_is_explorer() {
        let service = RewardsService::new(Arc::new(Store::in_memory().unwrap()));
        let membership = service.user_membership(&member(), today()).unwrap();
        assert_eq!(membership.tier.level, TierLevel::Explorer);
        assert_eq!(membership.points, 0);
        assert_eq!(membership.points_to_next_tier, Some(10_000));
        assert_eq!(membership.progress_percentage, 0.0);
    }

    #[test]
    fn test_recommendations_drop_expired_offers() {
        let service = seeded();
        let recs = service.recommendations(today());
        assert_eq!(recs.experiences.len(), 2);
        assert_eq!(recs.offers.len(), 2);
        assert!(recs.offers.iter().all(|o| o.valid_until >= today()));
    }

    #[test]
    fn test_book_stay_earns_at_tier_rate() {
        let service = seeded();
        let confirmation = service.book_stay("user-1", &stay(false), today()).unwrap();

        // 2 nights deluxe = $500, 10 pts/$ at 1.25x
        assert_eq!(confirmation.total_cost_cents, 50_000);
        assert_eq!(confirmation.points_earned, 6_250);
        assert_eq!(confirmation.points_redeemed, 0);
        assert_eq!(confirmation.upgrades, TierLevel::Voyager.stay_upgrades());
        assert!(confirmation.confirmation_number.starts_with("KR"));

        assert_eq!(service.balance("user-1").unwrap(), 22_000);
        let payments = service.payment_transactions("user-1").unwrap();
        assert_eq!(payments.len(), 5);
        assert!(payments
            .iter()
            .any(|p| p.status == PaymentStatus::Pending && p.payment_method == "Visa •••• 4242"));

        let views = service
            .bookings("user-1", &BookingFilter::default())
            .unwrap();
        assert_eq!(views.upcoming.len(), 3);
    }

    #[test]
    fn test_book_stay_with_points() {
        let service = seeded();
        let confirmation = service.book_stay("user-1", &stay(true), today()).unwrap();
        assert_eq!(confirmation.points_earned, 0);
        assert_eq!(confirmation.points_redeemed, 5_000);
        assert_eq!(service.balance("user-1").unwrap(), 10_750);
        assert_eq!(service.payment_transactions("user-1").unwrap().len(), 4);
    }

    #[test]
    fn test_book_stay_insufficient_points() {
        let service = RewardsService::new(Arc::new(Store::in_memory().unwrap()));
        let err = service.book_stay("user-1", &stay(true), today()).unwrap_err();
        assert!(matches!(
            err,
            RewardsError::Loyalty(LoyaltyError::InsufficientPoints {
                needed: 5_000,
                available: 0
            })
        ));
        assert!(service
            .bookings("user-1", &BookingFilter::default())
            .unwrap()
            .upcoming
            .is_empty());
    }

    #[test]
    fn test_book_stay_validation() {
        let service = seeded();
        let mut request = stay(false);
        request.room_type = "penthouse".to_string();
        assert!(matches!(
            service.book_stay("user-1", &request, today()),
            Err(RewardsError::Validation(_))
        ));
    }

    #[test]
    fn test_cancel_reverses_points() {
        let service = seeded();
        let confirmation = service.book_stay("user-1", &stay(false), today()).unwrap();
        let cancelled = service
            .cancel_booking("user-1", &confirmation.booking_id, today())
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(service.balance("user-1").unwrap(), 15_750);

        assert!(matches!(
            service.cancel_booking("user-1", &confirmation.booking_id, today()),
            Err(RewardsError::Loyalty(LoyaltyError::NotCancellable { .. }))
        ));
        assert!(matches!(
            service.cancel_booking("user-1", "booking-404", today()),
            Err(RewardsError::BookingNotFound(_))
        ));
    }

    #[test]
    fn test_cancel_points_paid_stay_refunds() {
        let service = seeded();
        let confirmation = service.book_stay("user-1", &stay(true), today()).unwrap();
        assert_eq!(service.balance("user-1").unwrap(), 10_750);

        let cancelled = service
            .cancel_booking("user-1", &confirmation.booking_id, today())
            .unwrap();
        assert_eq!(cancelled.points_redeemed, Some(5_000));
        assert_eq!(service.balance("user-1").unwrap(), 15_750);

        let history = service
            .point_history("user-1", &LedgerFilter::all(today()).search("refund"))
            .unwrap();
        assert_eq!(history.transactions.len(), 1);
        assert_eq!(history.transactions[0].points, 5_000);
    }

    #[test]
    fn test_cancel_voids_room_charge() {
        let service = seeded();
        let confirmation = service.book_stay("user-1", &stay(false), today()).unwrap();
        service
            .cancel_booking("user-1", &confirmation.booking_id, today())
            .unwrap();

        let payments = service.payment_transactions("user-1").unwrap();
        let charge = payments
            .iter()
            .find(|p| p.id == charge_id(&confirmation.booking_id))
            .unwrap();
        assert_eq!(charge.status, PaymentStatus::Failed);
        assert_eq!(payments.len(), 5);
    }

    #[test]
    fn test_concurrent_points_bookings_never_overdraw() {
        let service = Arc::new(seeded());
        // Drain 15,750 down to 5,750
        service
            .store
            .put_transaction(
                "user-1",
                &PointTransaction::redeem("tx-drain", today(), "Gift Card Redemption", 10_000),
            )
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || service.book_stay("user-1", &stay(true), today()))
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(successes, 1);
        assert_eq!(service.balance("user-1").unwrap(), 750);
    }

    #[test]
    fn test_point_history_filters() {
        let service = seeded();
        let filter = LedgerFilter::all(today())
            .kind(TypeFilter::Only(crate::loyalty::TransactionType::Redeem))
            .window(DateWindow::AllTime);
        let history = service.point_history("user-1", &filter).unwrap();

        assert_eq!(history.transactions.len(), 3);
        assert_eq!(history.summary.total_redeemed, 20_500);
        assert_eq!(history.balance, 15_750);

        let csv = service.export_points("user-1", &filter).unwrap();
        assert!(csv.starts_with("id,date,type,points,description"));
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_bookings_filter() {
        let service = seeded();
        let filter = BookingFilter::from_params(Some("bishoftu"), None, None).unwrap();
        let views = service.bookings("user-1", &filter).unwrap();
        assert_eq!(views.upcoming.len(), 1);
        assert_eq!(views.past.len(), 1);
        assert!(views.cancelled.is_empty());
    }

    #[test]
    fn test_wallet_operations_persist() {
        let service = seeded();
        let methods = service.set_default_payment_method("user-1", "card-2").unwrap();
        assert!(methods.iter().find(|m| m.id == "card-2").unwrap().is_default);

        let methods = service.remove_payment_method("user-1", "card-2").unwrap();
        assert_eq!(methods.len(), 1);
        assert!(methods[0].is_default);

        let card = PaymentMethod {
            id: "card-3".to_string(),
            kind: CardKind::Credit,
            card_brand: CardBrand::Amex,
            last_four: "0005".to_string(),
            expiry_month: 1,
            expiry_year: 2030,
            cardholder_name: "John Doe".to_string(),
            is_default: true,
            billing_address: BillingAddress {
                line1: "1 Lake Rd".to_string(),
                line2: None,
                city: "Bishoftu".to_string(),
                state: "Oromia".to_string(),
                postal_code: "1000".to_string(),
                country: "Ethiopia".to_string(),
            },
        };
        service.add_payment_method("user-1", card).unwrap();

        let stored = service.payment_methods("user-1").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored.iter().filter(|m| m.is_default).count(), 1);
        assert!(stored[1].is_default);

        assert!(matches!(
            service.set_default_payment_method("user-1", "card-404"),
            Err(RewardsError::Loyalty(LoyaltyError::PaymentMethodNotFound(_)))
        ));
    }

    #[test]
    fn test_preferences() {
        let service = seeded();
        assert_eq!(service.preferences("user-1").unwrap(), Preferences::default());

        let prefs = Preferences {
            language: "am".to_string(),
            ..Default::default()
        };
        service.update_preferences("user-1", &prefs).unwrap();
        assert_eq!(service.preferences("user-1").unwrap().language, "am");

        let bad = Preferences {
            theme: "neon".to_string(),
            ..Default::default()
        };
        assert!(service.update_preferences("user-1", &bad).is_err());
    }

    #[test]
    fn test_submit_registration() {
        let store = Arc::new(Store::in_memory().unwrap());
        let service = RewardsService::new(Arc::clone(&store));
        let registration = Registration::Dining(DiningRegistration {
            full_name: "John Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            time: "19:00".to_string(),
            number_of_guests: 2,
            special_requests: String::new(),
        });

        let id = service
            .submit_registration(&registration, Some(&member()))
            .unwrap();
        let stored = store
            .registrations(RegistrationKind::Dining.collection())
            .unwrap();
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].document["userId"], "user-1");

        let empty = Registration::Bed(crate::forms::BedRegistration {
            full_name: String::new(),
            date_range: DateRange::default(),
            room_type: String::new(),
            number_of_guests: 1,
            special_requests: String::new(),
        });
        assert!(matches!(
            service.submit_registration(&empty, None),
            Err(RewardsError::Validation(_))
        ));
    }
}
