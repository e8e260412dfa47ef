//! Pontos do mapa por município

use crate::aggregate::GroupCount;
use crate::reference::ReferenceData;
use serde::Serialize;

const PAD_LON: f64 = 0.20;
const PAD_LAT: f64 = 0.25;

/// Enquadramento do estado quando nenhum município tem centroide
pub const FALLBACK_BOUNDS: MapBounds = MapBounds {
    min_lon: -41.9,
    max_lon: -39.1,
    min_lat: -21.4,
    max_lat: -18.1,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub municipio: String,
    pub lon: f64,
    pub lat: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub points: Vec<MapPoint>,
    pub bounds: MapBounds,
    /// Municípios sem centroide conhecido
    pub unplaced: Vec<GroupCount>,
}

/// Junta as contagens por município com os centroides de referência
pub fn map_view(counts: &[GroupCount], reference: &ReferenceData) -> MapView {
    let mut points = Vec::new();
    let mut unplaced = Vec::new();

    for group in counts {
        match reference.centroid(&group.label) {
            Some([lon, lat]) => points.push(MapPoint {
                municipio: group.label.clone(),
                lon,
                lat,
                count: group.count,
            }),
            None => unplaced.push(group.clone()),
        }
    }

    let bounds = compute_bounds(&points);
    MapView { points, bounds, unplaced }
}

/// Enquadramento com folga de 0,20° em longitude e 0,25° em latitude
pub fn compute_bounds(points: &[MapPoint]) -> MapBounds {
    let Some(first) = points.first() else {
        return FALLBACK_BOUNDS;
    };

    let init = MapBounds {
        min_lon: first.lon,
        max_lon: first.lon,
        min_lat: first.lat,
        max_lat: first.lat,
    };
    let b = points.iter().fold(init, |b, p| MapBounds {
        min_lon: b.min_lon.min(p.lon),
        max_lon: b.max_lon.max(p.lon),
        min_lat: b.min_lat.min(p.lat),
        max_lat: b.max_lat.max(p.lat),
    });

    MapBounds {
        min_lon: b.min_lon - PAD_LON,
        max_lon: b.max_lon + PAD_LON,
        min_lat: b.min_lat - PAD_LAT,
        max_lat: b.max_lat + PAD_LAT,
    }
}
