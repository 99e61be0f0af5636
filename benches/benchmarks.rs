use aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::ChaCha20Poly1305;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use sha2::{Digest, Sha256, Sha512};
use sha3::Sha3_512;

use hbacore::cipher::{Aes, Direction};
use hbacore::hash::Hash;
use hbacore::hba::Hba;
use hbacore::key::SymmetricKey;
use hbacore::mac::HmacSha256;
use hbacore::permutation::{Keccak1600, Permutation};
use hbacore::treehash::ParallelTreeEngine;
use hbacore::{Sha3_256 as HbaSha3_256, Sha3_512 as HbaSha3_512};

const INPUT: usize = 100 * 1024;

fn hash_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("hash");
    g.sample_size(1_000);
    g.throughput(Throughput::Bytes(INPUT as u64));

    g.bench_with_input("hbacore-sha3-256", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut h = HbaSha3_256::new();
            let mut out = [0u8; 32];
            h.compute(block, &mut out);
            out
        })
    });
    g.bench_with_input("hbacore-sha3-512", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut h = HbaSha3_512::new();
            let mut out = [0u8; 64];
            h.compute(block, &mut out);
            out
        })
    });
    g.bench_with_input("hbacore-tree-sha3-256-fanout8", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut tree = ParallelTreeEngine::<HbaSha3_256>::new(8, 136, 8).unwrap();
            tree.update(block);
            let mut out = [0u8; 32];
            tree.finalize(&mut out);
            out
        })
    });
    g.bench_with_input("RustCrypto-SHA-3", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut digest = Sha3_512::default();
            digest.update(block);
            digest.finalize()
        })
    });
    g.bench_with_input("RustCrypto-SHA-256", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut digest = Sha256::default();
            digest.update(block);
            digest.finalize()
        })
    });
    g.bench_with_input("RustCrypto-SHA-512", &[0u8; INPUT], |b, block| {
        b.iter(|| {
            let mut digest = Sha512::default();
            digest.update(block);
            digest.finalize()
        })
    });
    g.finish();
}

fn aead_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("aead");
    g.sample_size(1_000);
    g.throughput(Throughput::Bytes(INPUT as u64));

    g.bench_with_input("HBA-AES-HMAC256", &[0u8; INPUT], |b, block| {
        let key = SymmetricKey::new(vec![7u8; 32], vec![8u8; 16], vec![]);
        b.iter(|| {
            let mut hba = Hba::<Aes, HmacSha256>::new(HmacSha256::default(), b"HBA-AES");
            hba.initialize(Direction::Encrypt, &key).unwrap();
            let mut out = vec![0u8; block.len()];
            hba.transform(block, &mut out).unwrap();
            let mut tag = [0u8; 32];
            hba.finalize(&mut tag).unwrap();
            out
        })
    });
    g.bench_with_input("AES-256-GCM", &[0u8; INPUT], |b, block| {
        let k = [7u8; 32];
        let n = [8u8; 12];
        b.iter(|| {
            let aes = Aes256Gcm::new(&k.into());
            aes.encrypt(
                &n.into(),
                Payload {
                    msg: block,
                    aad: &[],
                },
            )
        })
    });
    g.bench_with_input("AES-128-GCM", &[0u8; INPUT], |b, block| {
        let k = [7u8; 16];
        let n = [8u8; 12];
        b.iter(|| {
            let aes = Aes128Gcm::new(&k.into());
            aes.encrypt(
                &n.into(),
                Payload {
                    msg: block,
                    aad: &[],
                },
            )
        })
    });
    g.bench_with_input("ChaCha20Poly1305", &[0u8; INPUT], |b, block| {
        let k = [7u8; 32];
        let n = [8u8; 12];
        b.iter(|| {
            let chacha = ChaCha20Poly1305::new(&k.into());
            chacha.encrypt(
                &n.into(),
                Payload {
                    msg: block,
                    aad: &[],
                },
            )
        })
    });
    g.finish();
}

fn permutation_benchmarks(c: &mut Criterion) {
    let mut g = c.benchmark_group("permutation");
    g.sample_size(1_000);
    g.throughput(Throughput::Bytes(200));
    g.bench_function("Keccak-f1600-24", |b| {
        let mut state = [0u64; 25];
        b.iter(|| Keccak1600::permute(&mut state))
    });
    g.finish();
}

criterion_group!(
    benches,
    hash_benchmarks,
    aead_benchmarks,
    permutation_benchmarks
);
criterion_main!(benches);
