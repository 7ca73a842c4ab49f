use wander_protocol::{GeoPoint, Location};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometres.
///
/// Symmetric, non-negative, and exactly zero for identical points.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Locations strictly within `radius_km` of `center`, ascending by
/// distance, truncated to `limit`. The center itself is excluded by id.
#[must_use]
pub fn nearby<'a>(
    locations: &'a [Location],
    center: &Location,
    radius_km: f64,
    limit: usize,
) -> Vec<(&'a Location, f64)> {
    let mut hits: Vec<(&Location, f64)> = locations
        .iter()
        .filter(|location| location.id != center.id)
        .map(|location| (location, distance_km(center.geo, location.geo)))
        .filter(|(_, distance)| *distance < radius_km)
        .collect();

    hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::Gazetteer;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    #[test]
    fn zero_for_identical_points() {
        let p = point(18.8048, 98.9217);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = point(18.8048, 98.9217);
        let b = point(13.7515, 100.4917);
        let ab = distance_km(a, b);
        let ba = distance_km(b, a);
        assert!((ab - ba).abs() < 1e-9);
        assert!(ab > 0.0);
    }

    #[test]
    fn chiang_mai_to_bangkok_is_roughly_580km() {
        let doi_suthep = point(18.8048, 98.9217);
        let grand_palace = point(13.7515, 100.4917);
        let d = distance_km(doi_suthep, grand_palace);
        assert!((500.0..650.0).contains(&d), "got {d}");
    }

    #[test]
    fn nearby_excludes_center_and_sorts_ascending() {
        let gazetteer = Gazetteer::builtin();
        let center = gazetteer.location("cm-doi-suthep").unwrap();

        let hits = nearby(gazetteer.locations(), center, 100.0, 10);
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|(location, _)| location.id != center.id));
        assert!(hits.windows(2).all(|w| w[0].1 <= w[1].1));
        // Nimman is in town; Doi Inthanon is ~50km out; both within 100km.
        assert!(hits.iter().any(|(l, _)| l.id == "cm-nimman"));
        assert!(hits.iter().any(|(l, _)| l.id == "cm-doi-inthanon"));
        // Phi Phi is an ocean away.
        assert!(hits.iter().all(|(l, _)| l.id != "krabi-phi-phi"));
    }

    #[test]
    fn nearby_respects_limit() {
        let gazetteer = Gazetteer::builtin();
        let center = gazetteer.location("cm-doi-suthep").unwrap();
        let hits = nearby(gazetteer.locations(), center, 5000.0, 2);
        assert_eq!(hits.len(), 2);
    }
}
