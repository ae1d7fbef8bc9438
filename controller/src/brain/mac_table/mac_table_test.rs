use super::*;

#[test]
fn test_learn_and_lookup() {
    let mut table = MacTable::new();
    let a = EtherAddr([0x02, 0, 0, 0, 0, 0x01]);
    let b = EtherAddr([0x02, 0, 0, 0, 0, 0x02]);

    assert!(table.is_empty());
    assert_eq!(table.lookup(&a), None);

    table.learn(a, 1);
    table.learn(b, 2);
    assert_eq!(table.lookup(&a), Some(1));
    assert_eq!(table.lookup(&b), Some(2));
    assert_eq!(table.len(), 2);
}

#[test]
fn test_last_write_wins() {
    let mut table = MacTable::new();
    let a = EtherAddr([0x02, 0, 0, 0, 0, 0x01]);

    table.learn(a, 1);
    table.learn(a, 3);
    assert_eq!(table.lookup(&a), Some(3));
    assert_eq!(table.len(), 1);
}
