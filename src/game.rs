use tracing::{debug, trace};

use crate::action::{Action, CastleSide, Move, MoveFlags};
use crate::color::Color;
use crate::coordinate::Coordinate;
use crate::errors::{GameError, IllegalMove};
use crate::layout::Layout;
use crate::outcome::GameOutcome;
use crate::pieces::{PROMOTION_TYPES, Piece, PieceType};
use crate::threats::{
    BISHOP_DELTAS, KING_DELTAS, KNIGHT_DELTAS, ROOK_DELTAS, ThreatScan, is_attacked, threats_to,
};

/// Half-move clock value at which the game is drawn automatically.
pub const FIFTY_MOVE_LIMIT: u32 = 100;

/// File the king starts on when castling is still possible.
const KING_START_FILE: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    white_king_side: bool,
    white_queen_side: bool,
    black_king_side: bool,
    black_queen_side: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}

impl CastlingRights {
    pub fn new() -> Self {
        CastlingRights {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }

    pub fn none() -> Self {
        CastlingRights {
            white_king_side: false,
            white_queen_side: false,
            black_king_side: false,
            black_queen_side: false,
        }
    }

    pub fn has(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side,
        }
    }

    pub fn has_king_side(&self, color: Color) -> bool {
        self.has(color, CastleSide::KingSide)
    }

    pub fn has_queen_side(&self, color: Color) -> bool {
        self.has(color, CastleSide::QueenSide)
    }

    /// Aggregate right of one color: the AND of both per-rook rights. Derived, so it
    /// can never disagree with its constituents.
    pub fn can_castle(&self, color: Color) -> bool {
        self.has_king_side(color) && self.has_queen_side(color)
    }

    pub fn any(&self) -> bool {
        self.white_king_side || self.white_queen_side || self.black_king_side || self.black_queen_side
    }

    pub fn set(&mut self, color: Color, side: CastleSide, value: bool) {
        let right = match (color, side) {
            (Color::White, CastleSide::KingSide) => &mut self.white_king_side,
            (Color::White, CastleSide::QueenSide) => &mut self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => &mut self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => &mut self.black_queen_side,
        };
        *right = value;
    }

    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.set(color, side, false);
    }

    pub fn revoke_all(&mut self, color: Color) {
        self.revoke(color, CastleSide::KingSide);
        self.revoke(color, CastleSide::QueenSide);
    }

    /// Rights in FEN order, paired with their FEN letter.
    pub fn entries(&self) -> [(char, Color, CastleSide, bool); 4] {
        [
            ('K', Color::White, CastleSide::KingSide, self.white_king_side),
            ('Q', Color::White, CastleSide::QueenSide, self.white_queen_side),
            ('k', Color::Black, CastleSide::KingSide, self.black_king_side),
            ('q', Color::Black, CastleSide::QueenSide, self.black_queen_side),
        ]
    }
}

/// A chess position together with everything derived from it.
///
/// Games are created from FEN, from a figurine [`Board`](crate::board::Board) or with
/// [`Game::default`], and afterwards only transformed into new values by
/// [`Game::do_action`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    layout: Layout,
    castling_rights: CastlingRights,
    en_passant: Option<Coordinate>,
    half_move_clock: u32,
    full_move_number: u32,
    move_number: u32,

    is_check: bool,
    is_checkmate: bool,
    is_stalemate: bool,
    is_draw: bool,
    is_game_over: bool,
    game_over_winner: Option<Color>,
    in_check_by: Vec<(Coordinate, Piece)>,
    actions: Vec<Action>,
}

impl Default for Game {
    fn default() -> Self {
        Game::from_validated(
            Layout::standard(),
            Color::White,
            CastlingRights::new(),
            None,
            0,
            1,
        )
    }
}

impl Game {
    /// Builds a game from parts that the FEN or board codec already validated, then
    /// computes the derived fields.
    pub(crate) fn from_validated(
        layout: Layout,
        turn: Color,
        castling_rights: CastlingRights,
        en_passant: Option<Coordinate>,
        half_move_clock: u32,
        full_move_number: u32,
    ) -> Self {
        let move_number = full_move_number
            .saturating_sub(1)
            .saturating_mul(2)
            .saturating_add(match turn {
                Color::White => 0,
                Color::Black => 1,
            });

        Game {
            layout,
            castling_rights,
            en_passant,
            half_move_clock,
            full_move_number,
            move_number,
            is_check: false,
            is_checkmate: false,
            is_stalemate: false,
            is_draw: false,
            is_game_over: false,
            game_over_winner: None,
            in_check_by: Vec::new(),
            actions: Vec::new(),
        }
        .calculate_critical_flags()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn piece_at(&self, coord: Coordinate) -> Option<Piece> {
        self.layout.get_piece(coord)
    }

    pub fn pieces(&self, color: Color) -> Vec<(Coordinate, Piece)> {
        self.layout.pieces(color)
    }

    pub fn king(&self, color: Color) -> Option<Coordinate> {
        self.layout.king(color)
    }

    pub fn turn(&self) -> Color {
        Color::from_ply(self.move_number)
    }

    /// Plies played since the notional start of the game; even means White to move.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    pub fn full_move_number(&self) -> u32 {
        self.full_move_number
    }

    pub fn half_move_clock(&self) -> u32 {
        self.half_move_clock
    }

    pub fn castling_rights(&self) -> &CastlingRights {
        &self.castling_rights
    }

    pub fn en_passant_target(&self) -> Option<Coordinate> {
        self.en_passant
    }

    pub fn is_check(&self) -> bool {
        self.is_check
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.is_stalemate
    }

    pub fn is_draw(&self) -> bool {
        self.is_draw
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn game_over_winner(&self) -> Option<Color> {
        self.game_over_winner
    }

    /// Opposing pieces giving check to the side to move.
    pub fn in_check_by(&self) -> &[(Coordinate, Piece)] {
        &self.in_check_by
    }

    /// Every legal action for the side to move, resignation last.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn legal_actions_from(&self, from: Coordinate) -> Vec<Action> {
        self.actions
            .iter()
            .filter(|action| action.as_move().is_some_and(|mv| mv.from == from))
            .copied()
            .collect()
    }

    /// Looks up the legal move between two squares. `promotion` must be given exactly when
    /// the move promotes.
    pub fn find_action(
        &self,
        from: Coordinate,
        to: Coordinate,
        promotion: Option<PieceType>,
    ) -> Option<Action> {
        self.actions
            .iter()
            .find(|action| {
                action
                    .as_move()
                    .is_some_and(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
            })
            .copied()
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        if !self.is_game_over {
            return None;
        }

        match self.game_over_winner {
            Some(winner) => Some(GameOutcome::win_for(winner)),
            None if self.is_stalemate => Some(GameOutcome::Stalemate),
            None => Some(GameOutcome::FiftyMoveRule),
        }
    }

    /// Applies one of [`Game::actions`] and returns the resulting position.
    pub fn do_action(&self, action: &Action) -> Result<Game, GameError> {
        if self.is_game_over {
            return Err(GameError::GameOver);
        }
        if !self.actions.contains(action) {
            return Err(GameError::IllegalAction(action.to_string()));
        }

        let mv = match action {
            Action::Resign(color) => {
                let mut next = self.clone();
                next.is_game_over = true;
                next.game_over_winner = Some(color.opposite());
                next.actions.clear();
                debug!(loser = %color, "resignation");
                return Ok(next);
            }
            Action::Move(mv) => mv,
        };

        let mut next = self.clone();
        let color = mv.piece.color;
        next.layout = update_board_layout(&self.layout, mv);

        if mv.piece.piece_type == PieceType::King {
            next.castling_rights.revoke_all(color);
        }
        if mv.piece.piece_type == PieceType::Rook {
            if let Some(side) = original_rook_side(mv.from, color) {
                next.castling_rights.revoke(color, side);
            }
        }
        if let Some(side) = mv
            .captured_square()
            .and_then(|sq| original_rook_side(sq, color.opposite()))
        {
            next.castling_rights.revoke(color.opposite(), side);
        }

        next.move_number = next.move_number.saturating_add(1);
        if color == Color::Black {
            next.full_move_number = next.full_move_number.saturating_add(1);
        }

        next.en_passant = if mv.is_double_step() {
            mv.from.offset(0, color.pawn_direction())
        } else {
            None
        };

        if mv.is_capture() || mv.piece.piece_type == PieceType::Pawn {
            next.half_move_clock = 0;
        } else {
            next.half_move_clock = next.half_move_clock.saturating_add(1);
        }

        Ok(next.calculate_critical_flags())
    }

    /// Recomputes every derived field from the position.
    pub fn calculate_critical_flags(mut self) -> Self {
        let turn = self.turn();

        self.in_check_by = match self.layout.king(turn) {
            Some(king) => threats_to(&self.layout, king, turn, ThreatScan::Exhaustive)
                .into_iter()
                .collect(),
            None => Vec::new(),
        };
        self.is_check = !self.in_check_by.is_empty();
        self.is_game_over = false;
        self.game_over_winner = None;

        self.actions = self.calculate_all_actions();

        let only_resignation = self.actions.len() == 1 && self.actions[0].is_resign();
        self.is_checkmate = only_resignation && self.is_check;
        self.is_stalemate = only_resignation && !self.is_check;

        // Checkmate takes precedence over the forced draw.
        self.is_draw = self.half_move_clock >= FIFTY_MOVE_LIMIT && !self.is_checkmate;
        if self.is_draw {
            self.actions.clear();
        }

        self.is_game_over = self.is_draw || self.is_checkmate || self.is_stalemate;
        if self.is_checkmate {
            self.game_over_winner = Some(turn.opposite());
        }

        if self.is_game_over {
            debug!(
                checkmate = self.is_checkmate,
                stalemate = self.is_stalemate,
                draw = self.is_draw,
                "game over"
            );
        }

        self
    }

    /// Legal actions for the side to move: piece moves in board-scan order, then the
    /// resignation. Empty once the game is over.
    pub fn calculate_all_actions(&self) -> Vec<Action> {
        if self.is_game_over {
            return Vec::new();
        }

        let turn = self.turn();
        let mut actions = Vec::new();

        for (from, piece) in self.layout.pieces(turn) {
            for to in self.candidate_destinations(from, piece) {
                let promotes =
                    piece.piece_type == PieceType::Pawn && to.rank == turn.promotion_rank();
                let promotions: Vec<Option<PieceType>> = if promotes {
                    PROMOTION_TYPES.iter().copied().map(Some).collect()
                } else {
                    vec![None]
                };

                for promotion in promotions {
                    match self.build_action(piece, from, to, promotion) {
                        Ok(mv) => actions.push(Action::Move(mv)),
                        Err(reason) => trace!(%from, %to, %reason, "rejected candidate"),
                    }
                }
            }
        }

        actions.push(Action::Resign(turn));
        actions
    }

    fn candidate_destinations(&self, from: Coordinate, piece: Piece) -> Vec<Coordinate> {
        let steps = |deltas: &[(i8, i8)]| -> Vec<Coordinate> {
            deltas
                .iter()
                .filter_map(|&(df, dr)| from.offset(df, dr))
                .collect()
        };

        match piece.piece_type {
            PieceType::Pawn => {
                let dir = piece.color.pawn_direction();
                steps(&[(0, dir), (0, 2 * dir), (-1, dir), (1, dir)])
            }
            PieceType::Knight => steps(&KNIGHT_DELTAS),
            PieceType::King => {
                let mut destinations = steps(&KING_DELTAS);
                destinations.extend(steps(&[(2, 0), (-2, 0)]));
                destinations
            }
            PieceType::Bishop => self.sliding_destinations(from, &BISHOP_DELTAS),
            PieceType::Rook => self.sliding_destinations(from, &ROOK_DELTAS),
            PieceType::Queen => {
                let mut destinations = self.sliding_destinations(from, &ROOK_DELTAS);
                destinations.extend(self.sliding_destinations(from, &BISHOP_DELTAS));
                destinations
            }
        }
    }

    /// Walks each ray up to and including the first occupied square.
    fn sliding_destinations(&self, from: Coordinate, deltas: &[(i8, i8)]) -> Vec<Coordinate> {
        let mut destinations = Vec::new();

        for &(df, dr) in deltas {
            let mut cursor = from;
            while let Some(to) = cursor.offset(df, dr) {
                destinations.push(to);
                if !self.layout.is_empty(to) {
                    break;
                }
                cursor = to;
            }
        }

        destinations
    }

    /// Validates one candidate move of `piece` from `from` to `to` and describes it fully.
    pub fn build_action(
        &self,
        piece: Piece,
        from: Coordinate,
        to: Coordinate,
        promotion: Option<PieceType>,
    ) -> Result<Move, IllegalMove> {
        if !to.is_valid() || !from.is_valid() {
            return Err(IllegalMove::OutOfBounds);
        }

        let target = self.layout.get_piece(to);
        if target.is_some_and(|t| t.color == piece.color) {
            return Err(IllegalMove::FriendlyOccupied);
        }

        let df = to.file as i8 - from.file as i8;
        let dr = to.rank as i8 - from.rank as i8;
        let mut mv = Move::new(piece, from, to);

        match piece.piece_type {
            PieceType::Knight => {
                if !matches!((df.abs(), dr.abs()), (1, 2) | (2, 1)) {
                    return Err(IllegalMove::InvalidGeometry);
                }
            }
            PieceType::Bishop | PieceType::Rook | PieceType::Queen => {
                let diagonal = df.abs() == dr.abs() && df != 0;
                let straight = (df == 0) != (dr == 0);
                let allowed = match piece.piece_type {
                    PieceType::Bishop => diagonal,
                    PieceType::Rook => straight,
                    _ => diagonal || straight,
                };
                if !allowed {
                    return Err(IllegalMove::InvalidGeometry);
                }
                if !self.path_is_clear(from, to) {
                    return Err(IllegalMove::Blocked);
                }
            }
            PieceType::King => {
                if df.abs() == 2 && dr == 0 {
                    let side = if df > 0 {
                        CastleSide::KingSide
                    } else {
                        CastleSide::QueenSide
                    };
                    self.validate_castle(piece.color, from, to, side)?;
                    mv.flags |= match side {
                        CastleSide::KingSide => MoveFlags::CASTLE_KING_SIDE,
                        CastleSide::QueenSide => MoveFlags::CASTLE_QUEEN_SIDE,
                    };
                } else if df.abs() > 1 || dr.abs() > 1 || (df == 0 && dr == 0) {
                    return Err(IllegalMove::InvalidGeometry);
                }
            }
            PieceType::Pawn => {
                let dir = piece.color.pawn_direction();
                if df == 0 && dr == dir {
                    if target.is_some() {
                        return Err(IllegalMove::Blocked);
                    }
                } else if df == 0 && dr == 2 * dir {
                    if from.rank != piece.color.pawn_home_rank() {
                        return Err(IllegalMove::InvalidGeometry);
                    }
                    if target.is_some() || !from.offset(0, dir).is_some_and(|c| self.layout.is_empty(c)) {
                        return Err(IllegalMove::Blocked);
                    }
                    mv.flags |= MoveFlags::DOUBLE_STEP;
                } else if df.abs() == 1 && dr == dir {
                    if target.is_none() {
                        if self.en_passant != Some(to) {
                            return Err(IllegalMove::NothingToCapture);
                        }
                        mv.flags |= MoveFlags::EN_PASSANT_CAPTURE | MoveFlags::CAPTURE;
                        let victim = mv.captured_square().and_then(|sq| self.layout.get_piece(sq));
                        if victim != Some(Piece::new(PieceType::Pawn, piece.color.opposite())) {
                            return Err(IllegalMove::NothingToCapture);
                        }
                        mv.captured = Some(PieceType::Pawn);
                    }
                } else {
                    return Err(IllegalMove::InvalidGeometry);
                }
            }
        }

        if let Some(captured) = target {
            mv.flags |= MoveFlags::CAPTURE;
            mv.captured = Some(captured.piece_type);
        }

        let reaches_last_rank =
            piece.piece_type == PieceType::Pawn && to.rank == piece.color.promotion_rank();
        match (reaches_last_rank, promotion) {
            (true, Some(promo)) if promo.is_valid_promotion() => {
                mv.flags |= MoveFlags::PROMOTION;
                mv.promotion = Some(promo);
            }
            (false, None) => {}
            _ => return Err(IllegalMove::InvalidPromotion),
        }

        let after = update_board_layout(&self.layout, &mv);
        if let Some(king) = after.king(piece.color) {
            if !threats_to(&after, king, piece.color, ThreatScan::Exhaustive).is_empty() {
                return Err(IllegalMove::SelfCheck);
            }
        }

        Ok(mv)
    }

    /// True when every square strictly between `from` and `to` on a line is empty.
    fn path_is_clear(&self, from: Coordinate, to: Coordinate) -> bool {
        let step_file = (to.file as i8 - from.file as i8).signum();
        let step_rank = (to.rank as i8 - from.rank as i8).signum();

        let mut cursor = from;
        while let Some(next) = cursor.offset(step_file, step_rank) {
            if next == to {
                return true;
            }
            if !self.layout.is_empty(next) {
                return false;
            }
            cursor = next;
        }
        false
    }

    fn validate_castle(
        &self,
        color: Color,
        from: Coordinate,
        to: Coordinate,
        side: CastleSide,
    ) -> Result<(), IllegalMove> {
        if !self.castling_rights.has(color, side) {
            return Err(IllegalMove::CastlingNotAllowed);
        }

        let rank = color.back_rank();
        if from != Coordinate::new(KING_START_FILE, rank)
            || to != Coordinate::new(side.king_destination_file(), rank)
        {
            return Err(IllegalMove::CastlingNotAllowed);
        }

        let rook_square = Coordinate::new(side.rook_start_file(), rank);
        if self.layout.get_piece(rook_square) != Some(Piece::new(PieceType::Rook, color)) {
            return Err(IllegalMove::CastlingNotAllowed);
        }
        if !self.path_is_clear(from, rook_square) {
            return Err(IllegalMove::Blocked);
        }

        // The king may not start from, pass through or land on an attacked square.
        let (low, high) = if from.file < to.file {
            (from.file, to.file)
        } else {
            (to.file, from.file)
        };
        for file in low..=high {
            if is_attacked(&self.layout, Coordinate::new(file, rank), color) {
                return Err(IllegalMove::CastlingThroughCheck);
            }
        }

        Ok(())
    }
}

/// Board-only application of a move: relocates the mover (as its promoted type),
/// removes the captured piece and hops the rook when castling. Counters and derived
/// flags are untouched.
pub fn update_board_layout(layout: &Layout, mv: &Move) -> Layout {
    let mut next = *layout;

    if let Some(captured_square) = mv.captured_square() {
        next.set_piece(captured_square, None);
    }

    next.set_piece(mv.from, None);
    let placed = Piece::new(
        mv.promotion.unwrap_or(mv.piece.piece_type),
        mv.piece.color,
    );
    next.set_piece(mv.to, Some(placed));

    if let Some(side) = mv.castle_side() {
        let rank = mv.from.rank;
        let rook_from = Coordinate::new(side.rook_start_file(), rank);
        let rook_to = Coordinate::new(side.rook_destination_file(), rank);
        let rook = next.get_piece(rook_from);
        next.set_piece(rook_from, None);
        next.set_piece(rook_to, rook);
    }

    next
}

/// Which castling right a rook standing on `square` belongs to, if that square is one of
/// `color`'s original rook corners.
fn original_rook_side(square: Coordinate, color: Color) -> Option<CastleSide> {
    if square.rank != color.back_rank() {
        return None;
    }
    [CastleSide::KingSide, CastleSide::QueenSide]
        .into_iter()
        .find(|side| side.rook_start_file() == square.file)
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Game(turn: {}, is_over: {}, outcome: {:?})\n{}",
            self.turn(),
            self.is_game_over(),
            self.outcome(),
            self.layout
        )
    }
}
