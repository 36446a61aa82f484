//! Kuriftu Rewards demo
//!
//! Opens the configured store (or an in-memory one with `--memory`), signs
//! up a demo member, loads the sample bookings and points, and prints the
//! member's standing.

use chrono::Utc;
use kuriftu::auth::{AuthError, AuthService};
use kuriftu::config::Config;
use kuriftu::forms::{LoginForm, SignUpForm};
use kuriftu::loyalty::{BookingFilter, LedgerFilter, TypeFilter, TransactionType};
use kuriftu::rewards::RewardsService;
use kuriftu::store::Store;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_EMAIL: &str = "demo@kuriftu.example";
const DEMO_PASSWORD: &str = "kuriftu-demo";

fn main() -> anyhow::Result<()> {
    let config = Config::load_default();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Kuriftu Rewards v{}", env!("CARGO_PKG_VERSION"));

    let store = if std::env::args().any(|a| a == "--memory") {
        tracing::info!("Using in-memory store");
        Store::in_memory()?
    } else {
        let data_dir = config.data_dir();
        tracing::info!("Data directory: {:?}", data_dir);
        Store::open(&data_dir)?
    };
    let store = Arc::new(store);

    let auth = AuthService::new(Arc::clone(&store), config.auth.auth_config());
    let rewards = RewardsService::new(Arc::clone(&store));
    let today = Utc::now().date_naive();

    // Sign up once; later runs sign in to the same member
    let signup = SignUpForm {
        full_name: "Demo Member".to_string(),
        age: "30".to_string(),
        email: DEMO_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
    };
    let session = match auth.sign_up(&signup) {
        Ok(session) => {
            let seeded = rewards.seed_demo_member(&session.user.id, today)?;
            tracing::info!(?seeded, "Created demo member");
            session
        }
        Err(AuthError::EmailTaken) => auth.sign_in(&LoginForm {
            email: DEMO_EMAIL.to_string(),
            password: DEMO_PASSWORD.to_string(),
        })?,
        Err(e) => return Err(e.into()),
    };

    let membership = rewards.user_membership(&session.user, today)?;
    tracing::info!(
        "{} is a {} member with {} points ({} stays this year)",
        session.user.full_name,
        membership.tier.name,
        membership.points,
        membership.stays_this_year
    );
    match (&membership.next_tier, membership.points_to_next_tier) {
        (Some(next), Some(to_go)) => tracing::info!(
            "{} points to {} ({:.1}% of the way)",
            to_go,
            next.name,
            membership.progress_percentage
        ),
        _ => tracing::info!("Top tier reached"),
    }

    let earned = rewards.point_history(
        &session.user.id,
        &LedgerFilter::all(today).kind(TypeFilter::Only(TransactionType::Earn)),
    )?;
    tracing::info!(
        "Earned {} points over {} transactions",
        earned.summary.total_earned,
        earned.summary.earn_count
    );

    let bookings = rewards.bookings(&session.user.id, &BookingFilter::default())?;
    tracing::info!(
        upcoming = bookings.upcoming.len(),
        past = bookings.past.len(),
        cancelled = bookings.cancelled.len(),
        "Bookings"
    );
    for booking in &bookings.upcoming {
        tracing::info!(
            "Upcoming: {} ({}) {} -> {}",
            booking.hotel,
            booking.confirmation_number,
            booking.check_in,
            booking.check_out
        );
    }

    let stats = store.stats()?;
    tracing::info!(
        users = stats.users,
        bookings = stats.bookings,
        point_transactions = stats.point_transactions,
        "Store stats"
    );

    Ok(())
}
