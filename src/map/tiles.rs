use crate::location::Coordinate;

pub const TILE_SIZE: u32 = 256;

/// Web Mercator cannot represent the poles.
const MAX_LATITUDE: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// Fills `{z}`, `{x}` and `{y}` in a tile URL template.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub id: TileId,
    /// Where the tile's top-left corner lands in the window.
    pub offset: (i64, i64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileWindow {
    pub size: (u32, u32),
    pub tiles: Vec<PlacedTile>,
    /// Marker position in window pixels.
    pub marker: (i64, i64),
}

/// Position of a coordinate in global pixel space at `zoom`.
pub fn world_pixel(coordinate: Coordinate, zoom: u8) -> (f64, f64) {
    let world = f64::from(TILE_SIZE) * 2f64.powi(i32::from(zoom));
    let latitude = coordinate
        .latitude
        .clamp(-MAX_LATITUDE, MAX_LATITUDE)
        .to_radians();

    let x = (coordinate.longitude + 180.0) / 360.0 * world;
    let y = (1.0 - (latitude.tan() + 1.0 / latitude.cos()).ln() / std::f64::consts::PI) / 2.0
        * world;
    (x, y)
}

/// Tiles needed to draw a `size` window centered on `coordinate`. Columns
/// wrap around the antimeridian; rows beyond the poles are left out.
pub fn tile_window(coordinate: Coordinate, zoom: u8, size: (u32, u32)) -> TileWindow {
    let (width, height) = (i64::from(size.0), i64::from(size.1));
    let (center_x, center_y) = world_pixel(coordinate, zoom);
    let (center_x, center_y) = (center_x.floor() as i64, center_y.floor() as i64);
    let origin = (center_x - width / 2, center_y - height / 2);

    let tile = i64::from(TILE_SIZE);
    let tiles_per_side = 1i64 << zoom;

    let first_column = origin.0.div_euclid(tile);
    let last_column = (origin.0 + width - 1).div_euclid(tile);
    let first_row = origin.1.div_euclid(tile);
    let last_row = (origin.1 + height - 1).div_euclid(tile);

    let mut tiles = Vec::new();
    for row in first_row..=last_row {
        if row < 0 || row >= tiles_per_side {
            continue;
        }
        for column in first_column..=last_column {
            tiles.push(PlacedTile {
                id: TileId {
                    zoom,
                    x: column.rem_euclid(tiles_per_side) as u32,
                    y: row as u32,
                },
                offset: (column * tile - origin.0, row * tile - origin.1),
            });
        }
    }

    TileWindow {
        size,
        tiles,
        marker: (center_x - origin.0, center_y - origin.1),
    }
}
