//! 购物车持久化集成测试 - 文件数据库
//!
//! 验证购物车跨进程重开存活，以及无持久化后端时内存状态仍然权威。

use aero_client::{CartStore, LocalStore};
use tempfile::TempDir;

#[test]
fn cart_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.redb");

    {
        let store = LocalStore::open(&path).unwrap();
        let mut cart = CartStore::with_store(store);
        cart.add("kit_b", "Snack Box", 15000, 2);
        cart.add("kit_a", "Arrival Kit", 20000, 1);
        cart.decrement("kit_b");
    }

    // 重新打开同一个数据库文件
    let store = LocalStore::open(&path).unwrap();
    let cart = CartStore::with_store(store);

    assert_eq!(cart.total_cents(), 35000);
    // 恢复后保持加入顺序
    let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["kit_b", "kit_a"]);
    assert_eq!(cart.items()[0].qty, 1);
}

#[test]
fn clear_is_durable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.redb");

    {
        let store = LocalStore::open(&path).unwrap();
        let mut cart = CartStore::with_store(store);
        cart.add("kit_a", "Arrival Kit", 20000, 1);
        cart.clear();
    }

    let store = LocalStore::open(&path).unwrap();
    let cart = CartStore::with_store(store);
    assert!(cart.is_empty());
}

#[test]
fn tail_preference_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("client.redb");

    {
        let store = LocalStore::open(&path).unwrap();
        store.set_remembered_tail("N123AB").unwrap();
    }

    let store = LocalStore::open(&path).unwrap();
    assert_eq!(store.remembered_tail().unwrap().as_deref(), Some("N123AB"));
}

#[test]
fn cart_without_backend_stays_authoritative() {
    // 无持久化后端时所有操作照常工作，状态只活在内存里
    let mut cart = CartStore::new();
    cart.add("kit_a", "Arrival Kit", 20000, 3);
    cart.remove("kit_a");
    cart.add("kit_b", "Snack Box", 15000, 1);

    assert_eq!(cart.total_cents(), 15000);
    assert_eq!(cart.item_count(), 1);
}
