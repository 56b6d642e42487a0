//! Walk through every Mediana operation against the live API.
//!
//! Sends a plain SMS, a pattern SMS and an OTP, queries the account, and
//! finally checks the delivery status of everything that was sent.
//!
//! # Running
//!
//! ```bash
//! MEDIANA_API_KEY=your_api_key \
//! MEDIANA_TEST_PHONE=09XXXXXXXXX \
//! MEDIANA_SENDING_NUMBER=3000 \
//! MEDIANA_PATTERN_CODE=your_pattern \
//! MEDIANA_OTP_PATTERN=your_otp_pattern \
//! cargo run --example send_all
//! ```
//!
//! Pattern and OTP sends are skipped when their pattern code is not set.

use mediana_sms::{
    MedianaClient, MedianaError, OtpRequest, PatternRequest, RequestId, SendResult,
    SendSmsRequest,
};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let api_key =
        env::var("MEDIANA_API_KEY").expect("MEDIANA_API_KEY environment variable must be set");
    let phone = env::var("MEDIANA_TEST_PHONE")
        .expect("MEDIANA_TEST_PHONE environment variable must be set");
    let sending_number = env::var("MEDIANA_SENDING_NUMBER").unwrap_or_else(|_| "3000".into());
    let pattern_code = env::var("MEDIANA_PATTERN_CODE").ok();
    let otp_pattern = env::var("MEDIANA_OTP_PATTERN").ok();

    let client = MedianaClient::with_api_key(api_key)?;
    let mut request_codes = Vec::new();

    println!("Sending plain SMS from {sending_number}...");
    let request = SendSmsRequest::new([phone.as_str()], "Hello! This is a test message.")
        .with_sending_number(&sending_number);
    if let Some(sent) = report(client.send_sms(&request).await) {
        request_codes.push(sent.request_code);
    }

    match &pattern_code {
        Some(pattern_code) => {
            println!("\nSending pattern SMS ({pattern_code})...");
            let request = PatternRequest::new([phone.as_str()], pattern_code)
                .with_parameter("name", "Test User")
                .with_parameter("code", "98765");
            if let Some(sent) = report(client.send_pattern_sms(&request).await) {
                request_codes.push(sent.request_code);
            }
        }
        None => println!("\nSkipping pattern SMS: MEDIANA_PATTERN_CODE not set"),
    }

    match &otp_pattern {
        Some(otp_pattern) => {
            println!("\nSending OTP ({otp_pattern})...");
            let request = OtpRequest::new(otp_pattern, &phone, "123456");
            if let Some(sent) = report(client.send_otp(&request).await) {
                request_codes.push(sent.request_code);
            }
        }
        None => println!("\nSkipping OTP: MEDIANA_OTP_PATTERN not set"),
    }

    println!("\nAccount balance:");
    match client.get_account_balance().await {
        Ok(response) => println!("  {}", response.data.balance),
        Err(e) => print_error(&e),
    }

    println!("\nSending lines:");
    match client.get_sending_lines().await {
        Ok(response) => {
            for line in response.data {
                println!(
                    "  {} - {} (dedicated: {}, advertisement: {}, service: {}, until: {})",
                    line.number,
                    line.description.as_deref().unwrap_or("-"),
                    line.is_dedicated,
                    line.is_advertisement,
                    line.is_service,
                    line.usable_until.as_deref().unwrap_or("-"),
                );
            }
        }
        Err(e) => print_error(&e),
    }

    if let Some(pattern_code) = &pattern_code {
        println!("\nPattern detail for {pattern_code}:");
        match client.get_pattern_detail(pattern_code).await {
            Ok(response) => println!(
                "  {} (usable: {}): {}",
                response.data.title, response.data.is_usable, response.data.the_pattern.pattern
            ),
            Err(e) => print_error(&e),
        }
    }

    if request_codes.is_empty() {
        println!("\nNo request codes to check");
        return Ok(());
    }

    println!("\nWaiting 10 seconds for message processing...");
    tokio::time::sleep(Duration::from_secs(10)).await;

    for code in request_codes {
        let request_id: RequestId = match code.parse() {
            Ok(id) => id,
            Err(e) => {
                println!("\nRequest code '{code}' is not numeric: {e}");
                continue;
            }
        };

        println!("\nDelivery status for {request_id}:");
        match client.get_delivery_status(request_id).await {
            Ok(response) => {
                println!("  {}", response.data.status);
                for item in &response.data.sms_items {
                    println!(
                        "  - {} -> {}: {}",
                        item.sms_item_id,
                        item.recipient,
                        item.status.as_deref().unwrap_or("unknown")
                    );
                }
            }
            Err(e) => print_error(&e),
        }
    }

    Ok(())
}

/// Print the outcome of a send and return its result on success.
fn report(result: mediana_sms::Result<mediana_sms::ApiResponse<SendResult>>) -> Option<SendResult> {
    match result {
        Ok(response) => {
            let sent = response.into_data();
            println!(
                "  succeed: {}, status: {}, request code: {}",
                sent.succeed, sent.status, sent.request_code
            );
            for item in &sent.sms_items {
                println!("  - item {} -> {}", item.sms_item_id, item.recipient);
            }
            Some(sent)
        }
        Err(e) => {
            print_error(&e);
            None
        }
    }
}

fn print_error(error: &MedianaError) {
    println!("  Failed: {error}");

    if let Some(api_error) = error.as_api_error() {
        println!("  Status: {}", api_error.status);
        if let Some(code) = &api_error.code {
            println!("  Code: {code}");
        }
        for detail in &api_error.errors {
            println!("    {detail}");
        }
    }
}
