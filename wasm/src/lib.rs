use mine_inference as mi;
use wasm_bindgen::prelude::*;

/// Everything JavaScript holds between calls, passed back and forth as bytes.
#[derive(serde::Serialize, serde::Deserialize)]
struct Session {
    grid: mi::Grid,
    reasoner: mi::Reasoner<mi::Point>,
}

impl Session {
    fn decode(bts: &[u8]) -> Result<Self, String> {
        bcs::from_bytes(bts).map_err(|e| e.to_string())
    }

    fn encode(&self) -> Result<Vec<u8>, String> {
        bcs::to_bytes(self).map_err(|e| e.to_string())
    }
}

#[wasm_bindgen]
pub fn create_session(width: u8, height: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let session = Session {
        grid: mi::Grid::new(width as usize, height as usize),
        reasoner: mi::Reasoner::default(),
    };
    session.encode()
}

/// Feeds one revealed cell and its adjacent mine count to the reasoner.
#[wasm_bindgen]
pub fn observe(bts: Vec<u8>, x: usize, y: usize, count: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut session = Session::decode(&bts)?;
    let point = mi::Point { x, y };
    if !session.grid.contains(point) {
        return Err(format!("({x}, {y}) is off the board"));
    }
    let grid = session.grid;
    session
        .reasoner
        .observe(point, count.into(), |p| grid.neighbors(*p))
        .map_err(|e| e.to_string())?;
    session.encode()
}

/// Row-major cell states: -1 unknown, 0 known safe, 1 known mine, 2 played.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let session = Session::decode(&bts)?;
    let knowledge = session.reasoner.knowledge();
    Ok(session
        .grid
        .points()
        .map(|point| {
            if knowledge.moves_made().contains(&point) {
                2
            } else if knowledge.is_known_mine(&point) {
                1
            } else if knowledge.is_known_safe(&point) {
                0
            } else {
                -1
            }
        })
        .collect())
}

#[wasm_bindgen]
pub fn all_mines_found(bts: Vec<u8>, total_mines: usize) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let session = Session::decode(&bts)?;
    Ok(session.reasoner.all_mines_found(total_mines))
}
