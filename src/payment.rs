//! Payment form shared by the cart checkout and the pay page

use crate::types::{Payment, PaymentDetails, PaymentType};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentFormError {
    #[error("Please enter your UPI ID")]
    MissingUpiId,
    #[error("Please enter your card number")]
    MissingCardNumber,
    #[error("Please enter your bank name")]
    MissingBankName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub payment_type: PaymentType,
    pub upi_id: String,
    pub card_number: String,
    pub bank_name: String,
}

impl PaymentForm {
    pub fn with_type(payment_type: PaymentType) -> Self {
        Self { payment_type, ..Self::default() }
    }

    /// Check the field for the selected type and build the request body.
    /// Only the selected type's field is sent.
    pub fn validate(&self) -> Result<Payment, PaymentFormError> {
        let mut details = PaymentDetails::default();
        match self.payment_type {
            PaymentType::Cash => {}
            PaymentType::Upi => {
                details.upi_id = Some(required(&self.upi_id, PaymentFormError::MissingUpiId)?);
            }
            PaymentType::Card => {
                details.card_number =
                    Some(required(&self.card_number, PaymentFormError::MissingCardNumber)?);
            }
            PaymentType::Netbanking => {
                details.bank_name =
                    Some(required(&self.bank_name, PaymentFormError::MissingBankName)?);
            }
        }
        Ok(Payment { payment_type: self.payment_type, details })
    }

    /// Input the selected type asks for, as (placeholder, field)
    pub fn detail_field(&mut self) -> Option<(&'static str, &mut String)> {
        match self.payment_type {
            PaymentType::Cash => None,
            PaymentType::Upi => Some(("Enter UPI ID", &mut self.upi_id)),
            PaymentType::Card => Some(("Enter Card Number", &mut self.card_number)),
            PaymentType::Netbanking => Some(("Enter Bank Name", &mut self.bank_name)),
        }
    }
}

fn required(value: &str, missing: PaymentFormError) -> Result<String, PaymentFormError> {
    if value.trim().is_empty() {
        Err(missing)
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn cash_needs_no_details() {
        let payment = PaymentForm::default().validate().expect("cash is valid");
        assert_eq!(
            serde_json::to_value(payment).expect("encodes"),
            json!({ "type": "CASH", "details": {} })
        );
    }

    #[rstest]
    #[case::upi(PaymentType::Upi, "Please enter your UPI ID")]
    #[case::card(PaymentType::Card, "Please enter your card number")]
    #[case::netbanking(PaymentType::Netbanking, "Please enter your bank name")]
    fn blank_detail_is_rejected(#[case] payment_type: PaymentType, #[case] message: &str) {
        let mut form = PaymentForm::with_type(payment_type);
        if let Some((_, field)) = form.detail_field() {
            field.push_str("   ");
        }
        let error = form.validate().expect_err("blank must fail");
        assert_eq!(error.to_string(), message);
    }

    #[test]
    fn only_selected_field_is_sent() {
        let form = PaymentForm {
            payment_type: PaymentType::Card,
            upi_id: "ana@upi".into(),
            card_number: "4111 1111".into(),
            bank_name: "HDFC".into(),
        };
        let payment = form.validate().expect("card is valid");
        assert_eq!(
            serde_json::to_value(payment).expect("encodes"),
            json!({ "type": "CARD", "details": { "cardNumber": "4111 1111" } })
        );
    }

    #[test]
    fn netbanking_sends_bank_name() {
        let form = PaymentForm {
            payment_type: PaymentType::Netbanking,
            bank_name: "SBI".into(),
            ..PaymentForm::default()
        };
        let payment = form.validate().expect("valid");
        assert_eq!(payment.details.bank_name.as_deref(), Some("SBI"));
        assert_eq!(payment.details.upi_id, None);
    }
}
