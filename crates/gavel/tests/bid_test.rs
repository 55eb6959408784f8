//! integration tests for the bidding endpoints.
//!
//! drives the full minimum-increment scenario over the REST surface,
//! checking both status codes and the exact rejection strings clients
//! display.

mod common;

use axum::http::StatusCode;
use common::{BidTestFixture, response_json};
use gavel_db::Database;
use gavel_types::{ListingType, UserId, test_utils::TestListingBuilder};

#[tokio::test]
async fn test_bid_scenario_minimum_increment() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture.seed_auction().await;

    // below the start bid
    let response = fixture.place_bid(listing.id, UserId(2), 15).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Bid must be at least ₹20");

    // exactly the start bid
    let response = fixture.place_bid(listing.id, UserId(2), 20).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Bid placed");
    assert_eq!(body["current_bid"]["amount"], 20);
    assert_eq!(body["current_bid"]["bidder"], 2);

    // a second bidder matching the high bid is one rupee short
    let response = fixture.place_bid(listing.id, UserId(3), 20).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Bid must be at least ₹21");

    // raising works
    let response = fixture.place_bid(listing.id, UserId(3), 25).await;
    assert_eq!(response.status(), StatusCode::OK);

    // both bidders tracked with their own highest amounts
    let stored = fixture
        .db
        .get_auction_listing(listing.id)
        .await
        .unwrap()
        .unwrap();
    let auction = stored.auction.unwrap();
    assert_eq!(auction.highest_bids.len(), 2);
    assert_eq!(auction.highest_bids.get(UserId(2)), Some(20));
    assert_eq!(auction.highest_bids.get(UserId(3)), Some(25));
    let amounts: Vec<u64> = auction.bid_history.iter().map(|b| b.amount).collect();
    assert_eq!(amounts, vec![20, 25]);
}

#[tokio::test]
async fn test_seller_cannot_bid_on_own_listing() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture.seed_auction().await;

    // regardless of amount
    for amount in [15, 20, 1000] {
        let response = fixture.place_bid(listing.id, UserId(1), amount).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = response_json(response).await;
        assert_eq!(body["message"], "Sellers cannot bid on their own listing");
    }
}

#[tokio::test]
async fn test_bid_on_missing_listing() {
    let fixture = BidTestFixture::new().await;

    let response = fixture.place_bid(gavel_types::ListingId(404), UserId(2), 20).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Listing not found");
}

#[tokio::test]
async fn test_bid_on_non_auction_listing() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture
        .seed(
            TestListingBuilder::new(0)
                .with_seller(UserId(1))
                .with_type(ListingType::BuyNow),
        )
        .await;

    let response = fixture.place_bid(listing.id, UserId(2), 20).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Listing is not an auction type");
}

#[tokio::test]
async fn test_bid_on_expired_auction() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture
        .seed(
            TestListingBuilder::new(0)
                .with_seller(UserId(1))
                .ended_ago_secs(5),
        )
        .await;

    // the sweeper has not flipped the status yet; the deadline alone rejects
    let response = fixture.place_bid(listing.id, UserId(2), 100).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Auction period has ended");
}

#[tokio::test]
async fn test_zero_amount_rejected() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture.seed_auction().await;

    let response = fixture.place_bid(listing.id, UserId(2), 0).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Bid amount must be a positive number");
}

#[tokio::test]
async fn test_bid_requires_authentication() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture.seed_auction().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri(format!("/listings/{}/bids", listing.id))
        .header("content-type", "application/json")
        .body(axum::body::Body::from(r#"{"amount":20}"#))
        .unwrap();

    let response = tower::ServiceExt::oneshot(fixture.app.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bidding_status_for_bidder() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture.seed_auction().await;

    fixture.place_bid(listing.id, UserId(2), 20).await;
    fixture.place_bid(listing.id, UserId(3), 25).await;

    let response = fixture.bidding_status(listing.id, UserId(2)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["start_bid"], 20);
    assert_eq!(body["status"], "active");
    assert_eq!(body["current_bid"]["amount"], 25);
    assert_eq!(body["your_highest_bid"], 20);
    assert_eq!(body["bidders_count"], 2);
    assert_eq!(body["is_winner"], false);
    assert_eq!(body["winner_open"], false);
}

#[tokio::test]
async fn test_bidding_status_without_bids() {
    let fixture = BidTestFixture::new().await;
    let listing = fixture.seed_auction().await;

    let response = fixture.bidding_status(listing.id, UserId(2)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["current_bid"], serde_json::Value::Null);
    assert_eq!(body["your_highest_bid"], 0);
    assert_eq!(body["final_bid"], 0);
}
