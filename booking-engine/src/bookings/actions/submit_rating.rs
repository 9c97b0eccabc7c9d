//! SubmitRating command handler
//!
//! One rating per booking, customer-only, after completion. The rating
//! record and the booking's `rated` flag are two separate single-document
//! writes with no atomicity between them; the flag is flipped second, so a
//! crash in between can leave a rating whose booking still reads unrated.

use async_trait::async_trait;

use super::{ActionContext, BookingAction};
use crate::bookings::{BookingError, BookingResult};
use crate::policy;
use shared::booking::Rating;
use shared::util::now_millis;

/// SubmitRating action
#[derive(Debug, Clone)]
pub struct SubmitRatingAction {
    pub booking_id: String,
    /// 1-5
    pub stars: u8,
    pub comment: Option<String>,
}

#[async_trait]
impl BookingAction for SubmitRatingAction {
    type Output = Rating;

    async fn execute(&self, ctx: &ActionContext<'_>) -> BookingResult<Self::Output> {
        // 1. Customer-only operation
        if !policy::may_submit_rating(ctx.actor) {
            return Err(BookingError::Forbidden(
                "only customers can rate bookings".to_string(),
            ));
        }
        if !(1..=5).contains(&self.stars) {
            return Err(BookingError::Validation(format!(
                "stars must be between 1 and 5, got {}",
                self.stars
            )));
        }

        // 2. Load and gate on ownership, completion, one-shot flag
        let booking = ctx.bookings.get_booking(&self.booking_id).await?;
        if booking.customer_id != ctx.actor.id {
            return Err(BookingError::Forbidden(
                "bookings can only be rated by their owner".to_string(),
            ));
        }
        if !booking.is_completed() {
            return Err(BookingError::InvalidOperation(format!(
                "booking {} is not completed",
                self.booking_id
            )));
        }
        if booking.rated {
            return Err(BookingError::InvalidOperation(format!(
                "booking {} is already rated",
                self.booking_id
            )));
        }

        // 3. Rating record first, rated flag second (sibling writes)
        let rating = Rating {
            id: None,
            booking_id: self.booking_id.clone(),
            customer_id: ctx.actor.id.clone(),
            stars: self.stars,
            comment: self.comment.clone(),
            created_at: now_millis(),
        };
        let rating_id = ctx.bookings.create_rating(&rating).await?;
        ctx.bookings.set_rated(&self.booking_id).await?;

        Ok(Rating {
            id: Some(rating_id),
            ..rating
        })
    }
}
