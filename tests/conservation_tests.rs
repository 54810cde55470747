use marketledger::domain::item::ItemStatus;
use marketledger::error::MarketError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_trading_conserves_money() {
    let mut rng = StdRng::seed_from_u64(7);
    let market = common::in_memory_market();

    let mut users = Vec::new();
    for i in 0..10 {
        let balance = rng.gen_range(0..500);
        users.push(common::user_with_balance(&market, &format!("user{i}"), balance).await);
    }
    let mut items = Vec::new();
    for _ in 0..40 {
        let seller = users[rng.gen_range(0..users.len())];
        items.push(common::on_sale_item(&market, seller, rng.gen_range(1..200)).await);
    }
    let before = common::total_money(&market).await;

    let handles: Vec<_> = (0..200)
        .map(|_| {
            let buyer = users[rng.gen_range(0..users.len())];
            let item = items[rng.gen_range(0..items.len())];
            let market = Arc::clone(&market);
            tokio::spawn(async move { market.purchase(buyer, item).await })
        })
        .collect();

    let mut sold = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(
                MarketError::ItemNotAvailable
                | MarketError::SelfPurchaseForbidden
                | MarketError::InsufficientBalance { .. },
            ) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(common::total_money(&market).await, before);
    let sold_out = market
        .items()
        .await
        .unwrap()
        .iter()
        .filter(|i| i.status == ItemStatus::SoldOut)
        .count();
    assert_eq!(sold_out, sold);
}

#[tokio::test]
async fn test_failed_purchase_changes_nothing() {
    let market = common::in_memory_market();
    let seller = common::user_with_balance(&market, "seller", 20).await;
    let buyer = common::user_with_balance(&market, "buyer", 50).await;
    let item = common::on_sale_item(&market, seller, 100).await;

    let users_before = market.users().await.unwrap();
    let items_before = market.items().await.unwrap();

    assert!(matches!(
        market.purchase(buyer, item).await,
        Err(MarketError::InsufficientBalance { .. })
    ));
    assert!(matches!(
        market.purchase(seller, item).await,
        Err(MarketError::SelfPurchaseForbidden)
    ));

    assert_eq!(market.users().await.unwrap(), users_before);
    assert_eq!(market.items().await.unwrap(), items_before);
}
