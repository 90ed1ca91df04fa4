#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use prbt::PersistentMap;

#[derive(Arbitrary, Debug, Clone)]
enum MapOp {
    Insert { key: u16, val: u16 },
    InsertOrAssign { key: u16, val: u16 },
    Delete { key: u16 },
    Get { key: u16 },
    RemoveVersion { which: u8 },
}

/// Replays an arbitrary operation sequence against `prbt::PersistentMap`
/// while tracking, per published version, a `BTreeMap` oracle. Every
/// mutating op targets the *current* tracked version (mirroring the
/// convenience "default to current" rule), and every op's result — the
/// `inserted`/`existed` flag, the looked-up value, the iteration order — is
/// checked against the oracle for that exact version, not just the newest
/// one, so stale-version reads get exercised too.
fuzz_target!(|ops: Vec<MapOp>| {
    let mut map: PersistentMap<u16, u16> = PersistentMap::new();
    let mut versions = vec![map.current()];
    let mut oracles = vec![BTreeMap::<u16, u16>::new()];

    for op in ops {
        let current = *versions.last().unwrap();

        match op {
            MapOp::Insert { key, val } => {
                let mut oracle = oracles.last().unwrap().clone();
                let (new_v, inserted) = map.insert(current, key, val).unwrap();
                assert_eq!(inserted, !oracle.contains_key(&key));
                oracle.entry(key).or_insert(val);
                versions.push(new_v);
                oracles.push(oracle);
            }
            MapOp::InsertOrAssign { key, val } => {
                let mut oracle = oracles.last().unwrap().clone();
                let (new_v, inserted) = map.insert_or_assign(current, key, val).unwrap();
                assert_eq!(inserted, !oracle.contains_key(&key));
                oracle.insert(key, val);
                versions.push(new_v);
                oracles.push(oracle);
            }
            MapOp::Delete { key } => {
                let mut oracle = oracles.last().unwrap().clone();
                let (new_v, existed) = map.delete(current, &key).unwrap();
                assert_eq!(existed, oracle.contains_key(&key));
                oracle.remove(&key);
                versions.push(new_v);
                oracles.push(oracle);
            }
            MapOp::Get { key } => {
                let expected = oracles.last().unwrap().get(&key).copied();
                assert_eq!(map.get(current, &key).unwrap().copied(), expected);
            }
            MapOp::RemoveVersion { which } => {
                // Never target the version we're about to keep mutating
                // from, and never target the sentinel.
                if versions.len() > 1 {
                    let idx = 1 + (which as usize % (versions.len() - 1));
                    let candidate = versions[idx];
                    if candidate != current && map.is_live(candidate) {
                        map.remove_version(candidate).unwrap();
                    }
                }
            }
        }

        // Every still-live tracked version must still match its oracle —
        // this is the whole point of the fuzz target: catch any case where
        // a mutation against one version, or a reclamation of another,
        // leaked into a version it shouldn't have touched.
        for (v, oracle) in versions.iter().zip(oracles.iter()) {
            if map.is_live(*v) {
                let actual: BTreeMap<u16, u16> = map.iter(*v).unwrap().map(|(k, val)| (*k, *val)).collect();
                assert_eq!(&actual, oracle);
            }
        }
    }
});
