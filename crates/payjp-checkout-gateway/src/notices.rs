//! Buyer-facing checkout notices.

use serde::Serialize;

use payjp_checkout_core::FieldError;

/// Notice class. At most one transaction notice exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A card field failed validation.
    Field,
    /// The payment attempt failed.
    Transaction,
}

/// One notice shown on the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Class of the notice.
    pub kind: NoticeKind,
    /// Text shown to the buyer.
    pub message: String,
}

/// Notices collected for one payment attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NoticeBag {
    notices: Vec<Notice>,
}

impl NoticeBag {
    /// Empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field notice. Identical notices are kept once.
    pub fn add_field_error(&mut self, error: &FieldError) {
        let notice = Notice {
            kind: NoticeKind::Field,
            message: error.message(),
        };
        if !self.notices.contains(&notice) {
            self.notices.push(notice);
        }
    }

    /// Replace any transaction notice with `message`.
    pub fn set_transaction_error(&mut self, message: impl Into<String>) {
        self.notices.retain(|n| n.kind != NoticeKind::Transaction);
        self.notices.push(Notice {
            kind: NoticeKind::Transaction,
            message: message.into(),
        });
    }

    /// Whether no notice was raised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Number of notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// The notices in the order they were raised.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payjp_checkout_core::CardField;

    #[test]
    fn transaction_notice_is_replaced_not_stacked() {
        let mut bag = NoticeBag::new();
        bag.set_transaction_error("Error: declined");
        bag.set_transaction_error("Error: declined again");
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.notices()[0].message, "Error: declined again");
    }

    #[test]
    fn field_notices_are_deduplicated() {
        let mut bag = NoticeBag::new();
        bag.add_field_error(&FieldError::missing(CardField::CardCvc));
        bag.add_field_error(&FieldError::missing(CardField::CardCvc));
        bag.add_field_error(&FieldError::invalid(CardField::CardNumber));
        assert_eq!(bag.len(), 2);
        assert_eq!(bag.notices()[0].message, "Credit Card CVC is a required field.");
        assert_eq!(
            bag.notices()[1].message,
            "Please enter a valid Credit Card Number."
        );
    }
}
