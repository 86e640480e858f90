mod make_grid;

pub use make_grid::MakeGrid;
