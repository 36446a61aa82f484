//! Demo member data
//!
//! The records a freshly seeded demo account starts with, plus the
//! experience and offer catalog used for recommendations. Dates are laid
//! out relative to the seeding day so the demo member always qualifies as
//! a Voyager with upcoming stays ahead.

use chrono::{Datelike, Duration, NaiveDate};

use super::types::{
    BillingAddress, Booking, BookingStatus, CardBrand, CardKind, Experience, Offer,
    PaymentMethod, PaymentStatus, PaymentTransaction, PointTransaction, RedemptionOption,
};

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=128&width=128";

fn shift(today: NaiveDate, days: i64) -> NaiveDate {
    today + Duration::days(days)
}

struct Stay<'a> {
    id: &'a str,
    hotel: &'a str,
    location: &'a str,
    room_type: &'a str,
    guests: &'a str,
    confirmation_number: &'a str,
}

impl Stay<'_> {
    fn book(&self, check_in: NaiveDate, nights: i64, status: BookingStatus) -> Booking {
        Booking {
            id: self.id.to_string(),
            hotel: self.hotel.to_string(),
            location: self.location.to_string(),
            check_in,
            check_out: check_in + Duration::days(nights),
            room_type: self.room_type.to_string(),
            guests: self.guests.to_string(),
            status,
            confirmation_number: self.confirmation_number.to_string(),
            price_cents: None,
            points_earned: None,
            points_redeemed: None,
            image: Some(PLACEHOLDER_IMAGE.to_string()),
        }
    }
}

pub fn bookings(today: NaiveDate) -> Vec<Booking> {
    let mut bishoftu = Stay {
        id: "booking-1",
        hotel: "Kuriftu Resort Bishoftu",
        location: "Bishoftu, Ethiopia",
        room_type: "Lake View Suite",
        guests: "2 Adults",
        confirmation_number: "KR12345",
    }
    .book(shift(today, 30), 3, BookingStatus::Upcoming);
    bishoftu.price_cents = Some(75_000);

    let mut bahir_dar = Stay {
        id: "booking-2",
        hotel: "Kuriftu Resort Bahir Dar",
        location: "Bahir Dar, Ethiopia",
        room_type: "Presidential Suite",
        guests: "2 Adults, 1 Child",
        confirmation_number: "KR12789",
    }
    .book(shift(today, 90), 5, BookingStatus::Upcoming);
    bahir_dar.price_cents = Some(120_000);

    let mut past_bishoftu = Stay {
        id: "booking-3",
        hotel: "Kuriftu Resort Bishoftu",
        location: "Bishoftu, Ethiopia",
        room_type: "Deluxe Room",
        guests: "2 Adults",
        confirmation_number: "KR10987",
    }
    .book(shift(today, -8), 3, BookingStatus::Past);
    past_bishoftu.points_earned = Some(5_000);

    let mut lake_tana = Stay {
        id: "booking-4",
        hotel: "Kuriftu Resort Lake Tana",
        location: "Lake Tana, Ethiopia",
        room_type: "Lake View Suite",
        guests: "2 Adults",
        confirmation_number: "KR10567",
    }
    .book(shift(today, -157), 3, BookingStatus::Past);
    lake_tana.points_earned = Some(4_200);

    let mut entoto = Stay {
        id: "booking-6",
        hotel: "Kuriftu Resort Entoto",
        location: "Addis Ababa, Ethiopia",
        room_type: "Forest Cabin",
        guests: "2 Adults",
        confirmation_number: "KR10211",
    }
    .book(shift(today, -300), 2, BookingStatus::Past);
    entoto.points_earned = Some(2_800);

    let awash = Stay {
        id: "booking-5",
        hotel: "Kuriftu Resort Awash Falls",
        location: "Awash, Ethiopia",
        room_type: "Waterfall View Room",
        guests: "2 Adults",
        confirmation_number: "KR09876",
    }
    .book(shift(today, -400), 5, BookingStatus::Cancelled);

    vec![bishoftu, bahir_dar, past_bishoftu, lake_tana, entoto, awash]
}

pub fn point_history(today: NaiveDate) -> Vec<PointTransaction> {
    let d = |days: i64| shift(today, -days);
    vec![
        PointTransaction::earn("tx-1", d(5), "Stay at Kuriftu Resort Bishoftu", 5_000),
        PointTransaction::earn("tx-2", d(28), "Spa Treatment", 1_200),
        PointTransaction::redeem("tx-3", d(51), "Room Upgrade Redemption", 10_000),
        PointTransaction::earn("tx-4", d(102), "Dining at Kuriftu Restaurant", 750),
        PointTransaction::redeem("tx-5", d(137), "Spa Treatment Redemption", 8_000),
        PointTransaction::earn("tx-6", d(154), "Stay at Kuriftu Resort Lake Tana", 4_200),
        PointTransaction::earn("tx-7", d(191), "Welcome Bonus", 1_000),
        PointTransaction::redeem("tx-8", d(207), "Airport Transfer Redemption", 2_500),
        PointTransaction::earn("tx-9", d(298), "Stay at Kuriftu Resort Entoto", 2_800),
        PointTransaction::earn("tx-10", d(320), "Status Match Bonus", 21_300),
    ]
}

fn billing_address() -> BillingAddress {
    BillingAddress {
        line1: "123 Main St".to_string(),
        line2: None,
        city: "Anytown".to_string(),
        state: "CA".to_string(),
        postal_code: "12345".to_string(),
        country: "United States".to_string(),
    }
}

pub fn payment_methods(today: NaiveDate) -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            id: "card-1".to_string(),
            kind: CardKind::Credit,
            card_brand: CardBrand::Visa,
            last_four: "4242".to_string(),
            expiry_month: 12,
            expiry_year: today.year() + 2,
            cardholder_name: "John Doe".to_string(),
            is_default: true,
            billing_address: billing_address(),
        },
        PaymentMethod {
            id: "card-2".to_string(),
            kind: CardKind::Debit,
            card_brand: CardBrand::Mastercard,
            last_four: "5678".to_string(),
            expiry_month: 9,
            expiry_year: today.year() + 1,
            cardholder_name: "John Doe".to_string(),
            is_default: false,
            billing_address: billing_address(),
        },
    ]
}

pub fn payment_transactions(today: NaiveDate) -> Vec<PaymentTransaction> {
    let charge = |id: &str, days: i64, description: &str, amount_cents: i64, card: &str| {
        PaymentTransaction {
            id: id.to_string(),
            date: shift(today, -days),
            description: description.to_string(),
            amount_cents,
            status: PaymentStatus::Completed,
            payment_method: card.to_string(),
        }
    };

    vec![
        charge("pay-1", 5, "Kuriftu Resort Bishoftu - Room Charge", 75_000, "Visa •••• 4242"),
        charge("pay-2", 28, "Kuriftu Spa - Massage Treatment", 12_000, "Mastercard •••• 5678"),
        charge("pay-3", 51, "Kuriftu Restaurant - Dinner", 8_500, "Visa •••• 4242"),
        charge("pay-4", 97, "Kuriftu Resort Bahir Dar - Deposit", 20_000, "Visa •••• 4242"),
    ]
}

pub fn experiences() -> Vec<Experience> {
    vec![
        Experience {
            id: "spa-1".to_string(),
            title: "Relaxation Massage".to_string(),
            description: "Based on your previous bookings, we think you'll love our signature massage"
                .to_string(),
            earn_rate: "10 points per $1 spent on spa services".to_string(),
            redemption_options: vec![RedemptionOption {
                name: "90-min Signature Massage".to_string(),
                points: 12_000,
                value_cents: 12_000,
            }],
            image: "/placeholder.svg?height=600&width=800".to_string(),
        },
        Experience {
            id: "dining-2".to_string(),
            title: "Sunset Dinner".to_string(),
            description: "Enjoy a romantic dinner with lake views".to_string(),
            earn_rate: "10 points per $1 spent on food and beverages".to_string(),
            redemption_options: vec![RedemptionOption {
                name: "Complimentary Dinner for Two".to_string(),
                points: 15_000,
                value_cents: 15_000,
            }],
            image: "/placeholder.svg?height=600&width=800".to_string(),
        },
    ]
}

pub fn offers(today: NaiveDate) -> Vec<Offer> {
    vec![
        Offer {
            id: "offer-1".to_string(),
            title: "Weekend Getaway".to_string(),
            description: "20% off your next weekend stay".to_string(),
            discount: "20%".to_string(),
            valid_until: shift(today, 60),
        },
        Offer {
            id: "offer-2".to_string(),
            title: "Spa Credit".to_string(),
            description: "$50 spa credit with your next booking".to_string(),
            discount: "$50".to_string(),
            valid_until: shift(today, 30),
        },
        Offer {
            id: "offer-3".to_string(),
            title: "Rainy Season Escape".to_string(),
            description: "Third night free on lakeside stays".to_string(),
            discount: "1 night".to_string(),
            valid_until: shift(today, -10),
        },
    ]
}
