#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use proptest::prelude::*;

    use crate::config::{HailstoneConfig, PuzzleConfig};
    use crate::error::Error;
    use crate::puzzles::claws::{ClawMachine, ClawRules};
    use crate::puzzles::{Part, Puzzle};
    use crate::solver::{Backend, Cascade};
    use crate::exact::RationalSolver;
    use crate::lp::MilpSolver;

    const HAILSTONES: &str = "19, 13, 30 @ -2,  1, -2
18, 19, 22 @ -1, -1, -2
20, 25, 34 @ -2, -2, -4
12, 31, 28 @ -1, -2, -1
20, 19, 15 @  1, -5, -3
";

    const CLAWS: &str = "Button A: X+94, Y+34
Button B: X+22, Y+67
Prize: X=8400, Y=5400

Button A: X+26, Y+66
Button B: X+67, Y+21
Prize: X=12748, Y=12176

Button A: X+17, Y+86
Button B: X+84, Y+37
Prize: X=7870, Y=6450

Button A: X+69, Y+23
Button B: X+27, Y+71
Prize: X=18641, Y=10279
";

    const LIGHTS: &str = "[.##.] (3) (1,3) (2) (2,3) (0,2) (0,1) {3,5,4,7}
[...#.] (0,2,3,4) (2,3) (0,4) (0,1,2) (1,2,3,4) {7,5,12,7,2}
[.###.#] (0,1,2,3,4) (0,3,4) (0,1,2,4,5) (1,2) {10,11,11,5,10,5}
";

    const WIRING: &str = "jqt: rhn xhk nvd
rsh: frs pzl lsr
xhk: hfx
cmg: qnr nvd lhk bvb
rhn: xhk bvb hfx
bvb: xhk hfx
pzl: lsr hfx nvd
qnr: nvd
ntq: jqt hfx bvb xhk
nvd: lhk
lsr: lhk
rzs: qnr cmg lsr rsh
frs: qnr lhk lsr
";

    fn solve(puzzle: Puzzle, part: Part, input: &str, config: &PuzzleConfig) -> BigInt {
        puzzle.solve(part, input, config).unwrap().value
    }

    #[test]
    fn rock_through_every_hailstone() {
        let answer = Puzzle::Hailstones.solve(Part::Two, HAILSTONES, &PuzzleConfig::default()).unwrap();
        assert_eq!(answer.value, BigInt::from(47));
        assert_eq!(answer.diagnostics, vec!["sat", "x = 24", "y = 13", "z = 10"]);
    }

    #[test]
    fn rock_with_every_backend_that_can_find_it() {
        for backend in [Backend::Exact, Backend::Cascade] {
            let config = PuzzleConfig::default().with_backend(backend);
            assert_eq!(solve(Puzzle::Hailstones, Part::Two, HAILSTONES, &config), BigInt::from(47));
        }
    }

    #[test]
    fn crossing_hailstones() {
        let config = PuzzleConfig { hailstones: HailstoneConfig { test_min: 7, test_max: 27 }, ..Default::default() };
        assert_eq!(solve(Puzzle::Hailstones, Part::One, HAILSTONES, &config), BigInt::from(2));
    }

    #[test]
    fn claw_tokens() {
        let config = PuzzleConfig::default();
        assert_eq!(solve(Puzzle::Claws, Part::One, CLAWS, &config), BigInt::from(480));
        assert_eq!(solve(Puzzle::Claws, Part::Two, CLAWS, &config), BigInt::from(875318608908i64));
    }

    #[test]
    fn factory_presses() {
        let config = PuzzleConfig::default();
        assert_eq!(solve(Puzzle::Lights, Part::Two, LIGHTS, &config), BigInt::from(33));
        assert_eq!(solve(Puzzle::Lights, Part::One, LIGHTS, &config), BigInt::from(7));
    }

    #[test]
    fn factory_presses_need_more_than_elimination() {
        let config = PuzzleConfig::default().with_backend(Backend::Exact);
        assert!(matches!(Puzzle::Lights.solve(Part::Two, LIGHTS, &config), Err(Error::Indeterminate(_))));
    }

    #[test]
    fn snowverload() {
        assert_eq!(solve(Puzzle::Wiring, Part::One, WIRING, &PuzzleConfig::default()), BigInt::from(54));
    }

    #[test]
    fn malformed_input_stops_the_run() {
        let config = PuzzleConfig::default();
        assert!(matches!(Puzzle::Hailstones.solve(Part::Two, "19, 13, 30 @ -2, 1", &config), Err(Error::Parse(_))));
        assert!(matches!(Puzzle::Wiring.solve(Part::One, "jqt rhn", &config), Err(Error::Parse(_))));
        assert!(matches!(Puzzle::Claws.solve(Part::One, "", &config), Err(Error::Parse(_))));
    }

    fn brute_force(a: [i64; 2], b: [i64; 2], prize: [i64; 2]) -> Option<i64> {
        (0..=100i64)
            .flat_map(|hit_a| (0..=100i64).map(move |hit_b| (hit_a, hit_b)))
            .filter(|(hit_a, hit_b)| (0..2).all(|axis| hit_a * a[axis] + hit_b * b[axis] == prize[axis]))
            .map(|(hit_a, hit_b)| 3 * hit_a + hit_b)
            .min()
    }

    /// Cheapest `3x + y` with `a·x + b·y = n` over non-negative integers.
    /// Cost is linear in `x` and feasible `x` are spaced at most `b` apart, so only both ends need trying.
    fn cheapest_on_line(a: i128, b: i128, n: i128) -> Option<i128> {
        let last = n / a;
        (0..=b.min(last))
            .chain((last - b).max(0)..=last)
            .filter(|x| (n - a * x) % b == 0)
            .map(|x| 3 * x + (n - a * x) / b)
            .min()
    }

    proptest! {
        #[test]
        fn parallel_claw_cost_far_away(
            step in 1i64..5,
            a in 1i64..40,
            b in 1i64..40,
            prize in 0i64..10_000,
            skew in prop::sample::select(vec![0i64, 0, 0, 1]),
        ) {
            let machine = ClawMachine::new(
                1,
                [step * a, step * a].map(BigInt::from),
                [step * b, step * b].map(BigInt::from),
                [prize, prize + skew].map(BigInt::from),
            );

            let far = i128::from(prize) + 10000000000000;
            let step = i128::from(step);
            let expected = (skew == 0 && far % step == 0)
                .then(|| cheapest_on_line(a.into(), b.into(), far / step))
                .flatten();

            let solver = Cascade::new(RationalSolver, MilpSolver);
            let cost = machine.cost(&ClawRules::PART_TWO, &solver).unwrap();
            prop_assert_eq!(cost, expected.map(BigInt::from));
        }

        #[test]
        fn claw_cost_matches_brute_force(
            a in prop::array::uniform2(1i64..30),
            b in prop::array::uniform2(1i64..30),
            presses in prop::array::uniform2(0i64..40),
            nudge in prop::array::uniform2(0i64..3),
        ) {
            let prize = [0, 1].map(|axis| presses[0] * a[axis] + presses[1] * b[axis] + nudge[axis]);
            let machine = ClawMachine::new(1, a.map(BigInt::from), b.map(BigInt::from), prize.map(BigInt::from));

            let solver = Cascade::new(RationalSolver, MilpSolver);
            let cost = machine.cost(&ClawRules::PART_ONE, &solver).unwrap();
            prop_assert_eq!(cost, brute_force(a, b, prize).map(BigInt::from));
        }
    }
}
