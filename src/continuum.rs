//! The consistent hashing continuum
//!
//! A continuum is an immutable ring of hash points mapping onto weighted
//! servers. Each server is placed on the ring many times (160 points for
//! an equally-weighted server, scaled by its share of the total weight)
//! so that lookups distribute proportionally and removing a server only
//! remaps the keys it owned.

use crate::config::ServerSpec;
use crate::error::KetamaError;
use crate::hashing;
use tracing::debug;

/// Points emitted per server at equal weight (40 digests x 4 points each).
const POINTS_PER_SERVER: usize = 160;

/// One position on the ring, owned by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuumPoint {
    /// Position on the 32-bit ring
    pub hash: u32,

    /// Index into the continuum's server table
    pub server_index: usize,
}

/// Immutable ring snapshot: sorted points plus the owning server table.
///
/// Built once by [`Continuum::build`] and never mutated afterwards;
/// reconfiguration produces a brand-new `Continuum`. Lookup is an
/// O(log n) binary search with wraparound (the ring is logically
/// circular).
#[derive(Debug, Clone)]
pub struct Continuum {
    /// Ring points, ascending by hash
    points: Vec<ContinuumPoint>,

    /// Servers in input order; point `server_index` values refer here
    servers: Vec<ServerSpec>,
}

impl Continuum {
    /// Build a continuum from a weighted server set.
    ///
    /// Every server gets `round(weight / total_weight * 160 * n)` points,
    /// emitted four at a time from `digest("<address>-<i>")` for
    /// `i = 0..points/4`. Points are stably sorted by hash, so two points
    /// that collide keep their generation order (libketama's documented
    /// tie-break).
    pub fn build(servers: Vec<ServerSpec>) -> Result<Continuum, KetamaError> {
        if servers.is_empty() {
            return Err(KetamaError::Config("empty server set".to_string()));
        }

        if let Some(bad) = servers.iter().find(|s| s.weight == 0) {
            return Err(KetamaError::Config(format!(
                "non-positive weight for '{}'",
                bad.address
            )));
        }

        let total_weight: u64 = servers.iter().map(|s| u64::from(s.weight)).sum();
        let total_points = POINTS_PER_SERVER * servers.len();

        let mut points = Vec::with_capacity(total_points);

        for (server_index, server) in servers.iter().enumerate() {
            let share = f64::from(server.weight) / total_weight as f64;
            let target = (share * total_points as f64).round() as usize;

            // Four points per digest call, keyed by "<address>-<i>".
            for i in 0..target / 4 {
                let d = hashing::digest(format!("{}-{}", server.address, i).as_bytes());
                for offset in [0, 4, 8, 12] {
                    points.push(ContinuumPoint {
                        hash: hashing::hash32(&d, offset),
                        server_index,
                    });
                }
            }

            debug!(
                address = %server.address,
                weight = server.weight,
                points = target / 4 * 4,
                "placed server on continuum"
            );
        }

        // Stable sort: equal hashes keep generation order.
        points.sort_by_key(|p| p.hash);

        Ok(Continuum { points, servers })
    }

    /// Resolve a key to its owning server.
    ///
    /// Hashes the key and walks clockwise to the first point at or past
    /// it, wrapping to the lowest point when the key hashes above every
    /// point on the ring.
    pub fn lookup(&self, key: &[u8]) -> Result<&ServerSpec, KetamaError> {
        self.lookup_hash(hashing::hash_key(key))
    }

    /// Resolve a precomputed ring position to its owning server.
    pub fn lookup_hash(&self, hash: u32) -> Result<&ServerSpec, KetamaError> {
        if self.points.is_empty() {
            return Err(KetamaError::Lookup("empty continuum".to_string()));
        }

        // First point with hash >= key hash; past the end wraps to 0.
        let mut idx = self.points.partition_point(|p| p.hash < hash);
        if idx == self.points.len() {
            idx = 0;
        }

        let point = &self.points[idx];
        Ok(&self.servers[point.server_index])
    }

    /// The raw ring position a key hashes to.
    pub fn hash_key(key: &[u8]) -> u32 {
        hashing::hash_key(key)
    }

    /// Servers in input order.
    pub fn servers(&self) -> &[ServerSpec] {
        &self.servers
    }

    /// Ring points, ascending by hash.
    pub fn points(&self) -> &[ContinuumPoint] {
        &self.points
    }

    /// Number of servers in the table.
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Total number of points on the ring.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of points owned by the server at `index`.
    pub fn points_for(&self, index: usize) -> usize {
        self.points.iter().filter(|p| p.server_index == index).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_pool(n: usize) -> Vec<ServerSpec> {
        (1..=n)
            .map(|i| ServerSpec::new(format!("node{}:11211", i), 1000))
            .collect()
    }

    #[test]
    fn test_empty_set_rejected() {
        let err = Continuum::build(Vec::new()).unwrap_err();
        assert_eq!(err, KetamaError::Config("empty server set".to_string()));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let servers = vec![
            ServerSpec::new("node1:11211", 1000),
            ServerSpec::new("node2:11211", 0),
        ];
        let err = Continuum::build(servers).unwrap_err();
        assert!(matches!(err, KetamaError::Config(_)));
    }

    #[test]
    fn test_points_sorted_ascending() {
        let c = Continuum::build(equal_pool(4)).unwrap();
        for pair in c.points().windows(2) {
            assert!(pair[0].hash <= pair[1].hash);
        }
    }

    #[test]
    fn test_server_indices_valid_and_order_preserved() {
        let c = Continuum::build(equal_pool(4)).unwrap();
        assert_eq!(c.server_count(), 4);
        assert_eq!(c.servers()[0].address, "node1:11211");
        assert_eq!(c.servers()[3].address, "node4:11211");
        for p in c.points() {
            assert!(p.server_index < c.server_count());
        }
    }

    #[test]
    fn test_equal_weights_get_160_points_each() {
        let c = Continuum::build(equal_pool(4)).unwrap();
        assert_eq!(c.point_count(), 640);
        for i in 0..4 {
            assert_eq!(c.points_for(i), 160);
        }
    }

    #[test]
    fn test_weighted_point_counts_proportional() {
        let servers = vec![
            ServerSpec::new("node1:11211", 1000),
            ServerSpec::new("node2:11211", 1000),
            ServerSpec::new("node3:11211", 500),
        ];
        let c = Continuum::build(servers).unwrap();

        // total_points = 480, shares 0.4 / 0.4 / 0.2
        assert_eq!(c.points_for(0), 192);
        assert_eq!(c.points_for(1), 192);
        assert_eq!(c.points_for(2), 96);
    }

    #[test]
    fn test_lookup_deterministic() {
        let c = Continuum::build(equal_pool(4)).unwrap();
        let first = c.lookup(b"aab0").unwrap().address.clone();
        for _ in 0..1000 {
            assert_eq!(c.lookup(b"aab0").unwrap().address, first);
        }
    }

    #[test]
    fn test_identical_inputs_build_identical_rings() {
        let a = Continuum::build(equal_pool(3)).unwrap();
        let b = Continuum::build(equal_pool(3)).unwrap();
        assert_eq!(a.points(), b.points());
        for i in 0..100 {
            let key = format!("key-{}", i);
            assert_eq!(
                a.lookup(key.as_bytes()).unwrap(),
                b.lookup(key.as_bytes()).unwrap()
            );
        }
    }

    #[test]
    fn test_binary_search_agrees_with_linear_scan() {
        let c = Continuum::build(equal_pool(3)).unwrap();

        for hash in [0u32, 1, 0x4000_0000, 0x8000_0001, 0xffff_fffe, u32::MAX] {
            let expected = c
                .points()
                .iter()
                .find(|p| p.hash >= hash)
                .unwrap_or(&c.points()[0]);
            assert_eq!(
                c.lookup_hash(hash).unwrap().address,
                c.servers()[expected.server_index].address,
                "mismatch at hash {:#x}",
                hash
            );
        }
    }

    #[test]
    fn test_wraparound_past_highest_point() {
        let c = Continuum::build(equal_pool(4)).unwrap();
        let highest = c.points().last().unwrap().hash;
        assert!(highest < u32::MAX, "pool chosen so the ring top is open");

        let first = &c.points()[0];
        let wrapped = c.lookup_hash(highest.wrapping_add(1)).unwrap();
        assert_eq!(wrapped.address, c.servers()[first.server_index].address);
        assert_eq!(
            c.lookup_hash(u32::MAX).unwrap().address,
            c.servers()[first.server_index].address
        );
    }

    #[test]
    fn test_lookup_distribution_follows_weights() {
        use rand::{distributions::Alphanumeric, Rng, SeedableRng};

        let servers = vec![
            ServerSpec::new("node1:11211", 1000),
            ServerSpec::new("node2:11211", 1000),
            ServerSpec::new("node3:11211", 500),
        ];
        let c = Continuum::build(servers).unwrap();

        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let mut counts = [0usize; 3];
        let total = 10_000;

        for _ in 0..total {
            let key: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(12)
                .map(char::from)
                .collect();
            let server = c.lookup(key.as_bytes()).unwrap();
            let idx = c.servers().iter().position(|s| s == server).unwrap();
            counts[idx] += 1;
        }

        // node3 carries half the weight of node1/node2: expect roughly
        // 4000/4000/2000 within a 15% band.
        let expected = [4000.0, 4000.0, 2000.0];
        for (count, want) in counts.iter().zip(expected) {
            let delta = (*count as f64 - want).abs() / want;
            assert!(
                delta < 0.15,
                "distribution off: counts={:?} (delta {:.2})",
                counts,
                delta
            );
        }
    }

    #[test]
    fn test_scenario_aab_keys_spread_over_four_nodes() {
        let c = Continuum::build(equal_pool(4)).unwrap();

        let mut counts = [0usize; 4];
        for i in 0..100 {
            let key = format!("aab{}", i);
            let server = c.lookup(key.as_bytes()).unwrap();
            let idx = c.servers().iter().position(|s| s == server).unwrap();
            counts[idx] += 1;
        }

        assert_eq!(counts.iter().sum::<usize>(), 100);
        // Equal weights: ~25 keys each, with generous statistical slack.
        for (i, count) in counts.iter().enumerate() {
            assert!(
                (5..=50).contains(count),
                "node{} owns {} of 100 keys",
                i + 1,
                count
            );
        }
    }
}
