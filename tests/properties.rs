//! Property tests for the price index and the book.

use std::collections::BTreeMap;

use proptest::prelude::*;

use lob_core::orderbook::PriceIndex;
use lob_core::{Order, OrderBook, Side};

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(u64),
    Remove(u64),
}

fn tree_op() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        3 => (0u64..256).prop_map(TreeOp::Insert),
        2 => (0u64..256).prop_map(TreeOp::Remove),
    ]
}

#[derive(Debug, Clone)]
enum BookOp {
    Add { buy: bool, price: u64, quantity: u64 },
    Cancel(usize),
}

fn book_op() -> impl Strategy<Value = BookOp> {
    prop_oneof![
        3 => (any::<bool>(), 90u64..=110, 1u64..=20)
            .prop_map(|(buy, price, quantity)| BookOp::Add { buy, price, quantity }),
        1 => any::<usize>().prop_map(BookOp::Cancel),
    ]
}

proptest! {
    #[test]
    fn price_index_stays_balanced(ops in prop::collection::vec(tree_op(), 1..400)) {
        let mut tree = PriceIndex::new();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                TreeOp::Insert(price) => {
                    let inserted = tree.insert(price, price * 10).is_ok();
                    prop_assert_eq!(inserted, model.insert(price, price * 10).is_none());
                }
                TreeOp::Remove(price) => {
                    prop_assert_eq!(tree.remove(price), model.remove(&price));
                }
            }
            prop_assert!(tree.check_invariants().is_ok());
        }

        let keys: Vec<u64> = tree.iter().map(|(k, _)| k).collect();
        let expected: Vec<u64> = model.keys().copied().collect();
        prop_assert_eq!(keys, expected);
        prop_assert_eq!(tree.min_key(), model.keys().next().copied());
        prop_assert_eq!(tree.max_key(), model.keys().next_back().copied());
    }

    #[test]
    fn book_indexes_agree(ops in prop::collection::vec(book_op(), 1..300)) {
        let mut book = OrderBook::new();
        let mut next_id = 1;
        let mut placed = Vec::new();

        for op in ops {
            match op {
                BookOp::Add { buy, price, quantity } => {
                    let side = if buy { Side::Buy } else { Side::Sell };
                    let exec = book.add_order(Order::new(next_id, side, price, quantity, next_id)).unwrap();
                    prop_assert_eq!(exec.filled_quantity() + exec.remaining, quantity);
                    for trade in &exec.trades {
                        match side {
                            Side::Buy => prop_assert!(trade.price <= price),
                            Side::Sell => prop_assert!(trade.price >= price),
                        }
                    }
                    placed.push(next_id);
                    next_id += 1;
                }
                BookOp::Cancel(pick) if !placed.is_empty() => {
                    let id = placed[pick % placed.len()];
                    let was_resting = book.contains_order(id);
                    prop_assert_eq!(book.cancel_order(id).is_some(), was_resting);
                    prop_assert!(!book.contains_order(id));
                }
                BookOp::Cancel(_) => {}
            }

            prop_assert!(book.check_invariants().is_ok());
            if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
                prop_assert!(bid < ask, "book left crossed: {} >= {}", bid, ask);
            }
        }
    }

    #[test]
    fn non_crossing_add_cancel_round_trip(
        seed in prop::collection::vec((any::<bool>(), 1u64..=10), 0..40),
        buy in any::<bool>(),
        offset in 0u64..20,
        quantity in 1u64..50,
    ) {
        // Bids below 100, asks above, so nothing ever crosses
        let mut book = OrderBook::new();
        for (i, (is_buy, distance)) in seed.into_iter().enumerate() {
            let order = if is_buy {
                Order::new(i as u64 + 1, Side::Buy, 100 - distance, 5, 0)
            } else {
                Order::new(i as u64 + 1, Side::Sell, 100 + distance, 5, 0)
            };
            book.add_order(order).unwrap();
        }

        let root = book.compute_state_root();
        let bids: Vec<_> = book.levels(Side::Buy).collect();
        let asks: Vec<_> = book.levels(Side::Sell).collect();

        let order = if buy {
            Order::new(1_000, Side::Buy, 100 - 1 - offset.min(98), quantity, 1)
        } else {
            Order::new(1_000, Side::Sell, 101 + offset, quantity, 1)
        };
        let exec = book.add_order(order).unwrap();
        prop_assert!(exec.trades.is_empty());
        prop_assert!(book.cancel_order(1_000).is_some());

        prop_assert_eq!(book.compute_state_root(), root);
        prop_assert_eq!(book.levels(Side::Buy).collect::<Vec<_>>(), bids);
        prop_assert_eq!(book.levels(Side::Sell).collect::<Vec<_>>(), asks);
    }
}
