use futures::future::join_all;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::QuestionRecord,
    dto::response::ServerMessage,
    state::{
        SharedState,
        session::{PlayerHandle, ScoreTable},
        state_machine::SessionStateMachine,
    },
};

/// Points awarded for a correct answer.
const CORRECT_DELTA: i64 = 10;
/// Points deducted for a wrong or missing answer.
const WRONG_DELTA: i64 = -5;

/// Drive one game session from question sampling to score reconciliation.
///
/// Runs on its own task per group; the function returns only once the final
/// ranking has been broadcast and every player's score has been folded into
/// the user store.
pub async fn run_session(state: SharedState, session_id: Uuid, group: Vec<PlayerHandle>) {
    let questions = state.bank().sample(state.config().questions_per_game);
    GameSessionRunner::new(state, session_id, group, questions)
        .run()
        .await;
}

struct GameSessionRunner {
    state: SharedState,
    id: Uuid,
    players: Vec<PlayerHandle>,
    scores: ScoreTable,
    questions: Vec<QuestionRecord>,
    machine: SessionStateMachine,
    answer_timeout: Duration,
}

impl GameSessionRunner {
    fn new(
        state: SharedState,
        id: Uuid,
        players: Vec<PlayerHandle>,
        questions: Vec<QuestionRecord>,
    ) -> Self {
        let scores = ScoreTable::for_group(players.iter().map(PlayerHandle::username));
        let machine = SessionStateMachine::new(questions.len());
        let answer_timeout = state.config().answer_timeout;
        Self {
            state,
            id,
            players,
            scores,
            questions,
            machine,
            answer_timeout,
        }
    }

    async fn run(mut self) {
        info!(
            session = %self.id,
            players = self.players.len(),
            rounds = self.questions.len(),
            "game session started"
        );

        let questions = std::mem::take(&mut self.questions);
        for question in &questions {
            self.advance_phase();
            let answers = self.collect_answers(question).await;
            self.advance_phase();
            self.score_round(question, &answers);
        }

        self.advance_phase();
        self.finalize().await;
        self.advance_phase();
        info!(session = %self.id, "game session closed");
    }

    fn advance_phase(&mut self) {
        let phase = self.machine.advance();
        debug!(session = %self.id, ?phase, "session phase advanced");
    }

    /// Publish a question and gather every player's reply before the shared
    /// deadline. The result vector lines up with `self.players`.
    async fn collect_answers(&mut self, question: &QuestionRecord) -> Vec<Option<u32>> {
        self.broadcast(ServerMessage::question(question));

        let deadline = Instant::now() + self.answer_timeout;
        let waits = self
            .players
            .iter_mut()
            .map(|player| player.await_answer(question.id, deadline));
        join_all(waits).await
    }

    fn score_round(&mut self, question: &QuestionRecord, answers: &[Option<u32>]) {
        for (player, answer) in self.players.iter().zip(answers) {
            let correct = *answer == Some(question.answer);
            let delta = if correct { CORRECT_DELTA } else { WRONG_DELTA };
            let score = self.scores.apply(player.username(), delta);
            debug!(
                session = %self.id,
                user = player.username(),
                question = question.id,
                correct,
                score,
                "round scored"
            );
            if !player.send(ServerMessage::RoundResult { correct, score }) {
                debug!(
                    session = %self.id,
                    conn = player.conn_id(),
                    "round result undelivered"
                );
            }
        }
    }

    /// Broadcast the final ranking and fold session points into the store.
    async fn finalize(&mut self) {
        let ranking = self.scores.ranking();
        self.broadcast(ServerMessage::SessionEnd { ranking });

        let store = self.state.store();
        for (user, pts) in self.scores.rows() {
            match store.add_score(user.to_string(), pts).await {
                Ok(total) => {
                    debug!(
                        session = %self.id,
                        user,
                        session_points = pts,
                        total,
                        "score reconciled"
                    );
                }
                Err(err) => {
                    warn!(
                        session = %self.id,
                        user,
                        error = %err,
                        "failed to reconcile score"
                    );
                }
            }
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for player in &self.players {
            if !player.send(message.clone()) {
                debug!(
                    session = %self.id,
                    conn = player.conn_id(),
                    "player unreachable, skipping broadcast"
                );
            }
        }
    }
}
