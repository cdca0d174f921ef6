use delve_core::{CellCoord, Grid, GridView, Room, SearchStrategy};
use delve_system_pathfinding::{breadth_first, exploration, find_path};

const MAZE: [&str; 7] = [
    "#########",
    "#...#...#",
    "#.#.#.#.#",
    "#.#...#.#",
    "#.#####.#",
    "#.......#",
    "#########",
];

fn walkable_cells(grid: &Grid) -> Vec<CellCoord> {
    grid.iter()
        .filter(|(_, kind)| kind.is_walkable())
        .map(|(cell, _)| cell)
        .collect()
}

fn assert_contiguous(path: &[CellCoord], grid: &Grid) {
    let view = GridView::new(grid);
    for cell in path {
        assert!(view.is_walkable(*cell), "{cell:?} is not walkable");
    }
    for pair in path.windows(2) {
        assert_eq!(
            pair[0].manhattan_distance(pair[1]),
            1,
            "{:?} and {:?} are not adjacent",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn optimal_strategies_agree_and_others_never_beat_them() {
    let grid = Grid::from_ascii(&MAZE);
    let view = GridView::new(&grid);
    let rooms = [
        Room::from_origin_and_size(CellCoord::new(1, 1), 3, 1),
        Room::from_origin_and_size(CellCoord::new(5, 1), 3, 1),
    ];
    let cells = walkable_cells(&grid);

    for &start in &cells {
        for &goal in &cells {
            let optimal = find_path(SearchStrategy::BreadthFirst, view, start, goal, &rooms);
            assert!(!optimal.is_empty(), "{start:?} -> {goal:?} should be reachable");

            for strategy in SearchStrategy::ALL {
                let path = find_path(strategy, view, start, goal, &rooms);
                assert_eq!(path.first(), Some(&start), "{strategy:?}");
                assert_eq!(path.last(), Some(&goal), "{strategy:?}");
                assert_contiguous(&path, &grid);

                match strategy {
                    SearchStrategy::AStar => assert_eq!(path.len(), optimal.len()),
                    _ => assert!(path.len() >= optimal.len(), "{strategy:?} beat the optimum"),
                }
            }
        }
    }
}

#[test]
fn identical_start_and_goal_yield_single_cell() {
    let grid = Grid::from_ascii(&MAZE);
    let view = GridView::new(&grid);
    let cell = CellCoord::new(3, 3);
    let rooms = [Room::from_origin_and_size(CellCoord::new(5, 1), 3, 1)];

    for strategy in SearchStrategy::ALL {
        assert_eq!(find_path(strategy, view, cell, cell, &rooms), vec![cell], "{strategy:?}");
    }
}

#[test]
fn sealed_goal_is_unreachable_for_every_strategy() {
    let grid = Grid::from_ascii(&["#######", "#...#.#", "#...###", "#######"]);
    let view = GridView::new(&grid);
    let start = CellCoord::new(1, 1);
    let goal = CellCoord::new(5, 1);
    let rooms = [
        Room::from_origin_and_size(CellCoord::new(1, 1), 3, 2),
        Room::from_origin_and_size(CellCoord::new(5, 1), 1, 1),
    ];

    for strategy in SearchStrategy::ALL {
        assert!(
            find_path(strategy, view, start, goal, &rooms).is_empty(),
            "{strategy:?} found a path into a sealed cell"
        );
    }
}

#[test]
fn open_room_path_matches_manhattan_distance() {
    let mut rows = vec!["##########".to_owned()];
    for row in 1..9 {
        if row == 4 {
            rows.push("#.........".to_owned());
        } else {
            rows.push("#........#".to_owned());
        }
    }
    rows.push("##########".to_owned());
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let mut grid = Grid::from_ascii(&rows);
    grid.set(CellCoord::new(8, 8), delve_core::CellKind::Exit);

    let start = CellCoord::new(1, 1);
    let exit = GridView::new(&grid).find_exit().expect("exit placed");
    let path = find_path(
        SearchStrategy::BreadthFirst,
        GridView::new(&grid),
        start,
        exit,
        &[],
    );

    assert_eq!(exit, CellCoord::new(8, 8));
    assert_eq!(path.len(), start.manhattan_distance(exit) as usize + 1);
}

#[test]
fn exploration_tours_rooms_and_covers_the_direct_route() {
    let grid = Grid::from_ascii(&[
        "#######################",
        "#.....###.....###.....#",
        "#.....###.....###.....#",
        "#.....................#",
        "#.....###.....###.....#",
        "#.....###.....###.....#",
        "#######################",
    ]);
    let view = GridView::new(&grid);
    let rooms = [
        Room::from_origin_and_size(CellCoord::new(1, 1), 5, 5),
        Room::from_origin_and_size(CellCoord::new(9, 1), 5, 5),
        Room::from_origin_and_size(CellCoord::new(17, 1), 5, 5),
    ];
    let start = rooms[0].center();
    let goal = rooms[2].center();

    let toured = exploration(view, start, goal, &rooms);
    let direct = breadth_first(view, start, goal);

    assert_eq!(toured.last(), Some(&goal));
    assert!(toured.contains(&rooms[1].center()));
    for cell in &direct {
        assert!(toured.contains(cell), "{cell:?} missing from tour");
    }
    assert_contiguous(&toured, &grid);
}

#[test]
fn exploration_skips_unreachable_rooms() {
    let grid = Grid::from_ascii(&["#########", "#...#.#.#", "#########"]);
    let view = GridView::new(&grid);
    let rooms = [
        Room::from_origin_and_size(CellCoord::new(1, 1), 3, 1),
        Room::from_origin_and_size(CellCoord::new(5, 1), 1, 1),
    ];

    let path = exploration(view, CellCoord::new(1, 1), CellCoord::new(3, 1), &rooms);
    assert_eq!(
        path,
        vec![CellCoord::new(1, 1), CellCoord::new(2, 1), CellCoord::new(3, 1)]
    );
}
