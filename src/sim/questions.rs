//! Question bank and difficulty-aware selection
//!
//! Three static tiers of active/passive sentence pairs. The selector widens
//! the pool as the score grows and never repeats a question until the pool
//! is exhausted.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::state::GameMode;
use crate::consts::{CHALLENGE_MIX_SCORE, TIER_2_SCORE, TIER_3_SCORE};

/// An active sentence with its correct passive form and two distractors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub active: &'static str,
    pub passive: &'static str,
    pub distractors: [&'static str; 2],
}

/// One door label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub text: String,
    pub is_correct: bool,
}

const fn q(active: &'static str, passive: &'static str, d0: &'static str, d1: &'static str) -> Question {
    Question {
        active,
        passive,
        distractors: [d0, d1],
    }
}

/// Tier 1: simple past / present
pub const TIER_1: &[Question] = &[
    q("I booked a room", "A room was booked by me", "A room is booked by me", "A room booked me"),
    q("She eats an apple", "An apple is eaten by her", "An apple was eaten by her", "An apple eats her"),
    q("He wrote a letter", "A letter was written by him", "A letter is written by him", "A letter was wrote by him"),
    q("My mom loves me", "I am loved by my mom", "I was loved by my mom", "I love my mom"),
    q("Someone stole my car", "My car was stolen", "My car is stolen", "My car was stole"),
    q("John opened the door", "The door was opened by John", "The door is opened by John", "The door opens John"),
    q("They built this house", "This house was built by them", "This house is built by them", "This house built them"),
    q("Everyone loves chocolate", "Chocolate is loved by everyone", "Chocolate was loved by everyone", "Chocolate loves everyone"),
    q("We love FKYC", "FKYC is loved by us", "FKYC was loved by us", "FKYC loves us"),
    q("Students wear uniforms", "Uniforms are worn by students", "Uniforms were worn by students", "Uniforms wear students"),
    q("I eat dim sum", "Dim sum is eaten by me", "Dim sum was eaten by me", "Dim sum eats me"),
    q("The MTR takes me home", "I am taken home by the MTR", "I was taken home by the MTR", "I took the MTR home"),
    q("He plays Minecraft", "Minecraft is played by him", "Minecraft was played by him", "Minecraft played him"),
    q("She uses an iPhone", "An iPhone is used by her", "An iPhone was used by her", "An iPhone used her"),
    q("The prefects help us", "We are helped by the prefects", "We were helped by the prefects", "We help the prefects"),
    q("Fill in: The book ___ read by her.", "was", "were", "did"),
    q("Fill in: The car ___ washed.", "is", "are", "do"),
];

/// Tier 2: continuous / perfect / negatives
pub const TIER_2: &[Question] = &[
    q("They play football", "Football is played by them", "Football was played by them", "Football is playing them"),
    q("The cat drank the milk", "The milk was drunk by the cat", "The milk is drunk by the cat", "The milk drank the cat"),
    q("We are learning English", "English is being learned by us", "English was learned by us", "English is learned by us"),
    q("He helps the poor", "The poor are helped by him", "The poor is helped by him", "The poor were helped by him"),
    q("She is singing a song", "A song is being sung by her", "A song was sung by her", "A song is sung by her"),
    q("I have finished the job", "The job has been finished by me", "The job was finished by me", "The job is finished by me"),
    q("He did not write the letter", "The letter was not written by him", "The letter is not written by him", "The letter not written by him"),
    q("Picasso painted this picture", "This picture was painted by Picasso", "This picture is painted by Picasso", "This picture painted Picasso"),
    q("They are building a bridge", "A bridge is being built", "A bridge is built", "A bridge was built"),
    q("I have lost my Octopus card", "My Octopus card has been lost", "My Octopus card was lost", "My Octopus card is lost"),
    q("The teacher is marking exams", "Exams are being marked", "Exams were marked", "Exams are marked"),
    q("Someone has eaten my lunch", "My lunch has been eaten", "My lunch was eaten", "My lunch is eaten"),
    q("We are watching Mirror", "Mirror is being watched by us", "Mirror was watched by us", "Mirror watched us"),
    q("She hasn't done the homework", "The homework hasn't been done", "The homework wasn't done", "The homework isn't done"),
    q("They were cleaning the floor", "The floor was being cleaned", "The floor is being cleaned", "The floor has been cleaned"),
    q("Fill in: The house is ___ built.", "being", "been", "be"),
    q("Fill in: Lunch has ___ served.", "been", "being", "be"),
];

/// Tier 3: modals / complex / questions
pub const TIER_3: &[Question] = &[
    q("I will clean the room", "The room will be cleaned by me", "The room is cleaned by me", "The room will cleaned by me"),
    q("The police caught the thief", "The thief was caught by the police", "The thief is caught by the police", "The thief caught the police"),
    q("Did she do the homework?", "Was the homework done by her?", "Is the homework done by her?", "Did the homework done by her?"),
    q("They will buy a new car", "A new car will be bought by them", "A new car is bought by them", "A new car will bought by them"),
    q("You can solve this problem", "This problem can be solved by you", "This problem could be solved", "This problem can solved"),
    q("She had cooked dinner", "Dinner had been cooked by her", "Dinner has been cooked by her", "Dinner was cooked by her"),
    q("They might visit us", "We might be visited by them", "We might visited by them", "We may be visited by them"),
    q("Who wrote this book?", "By whom was this book written?", "Who was written this book?", "By whom is this book written?"),
    q("You must wear a mask", "A mask must be worn", "A mask has to be worn", "A mask was worn"),
    q("We can save the planet", "The planet can be saved by us", "The planet could be saved", "The planet saved us"),
    q("Will you pass the DSE?", "Will the DSE be passed by you?", "Will the DSE passed by you?", "Is the DSE passed by you?"),
    q("They should stop the noise", "The noise should be stopped", "The noise shall be stopped", "The noise stopped"),
    q("Did you see the Victoria Harbour?", "Was the Victoria Harbour seen?", "Is the Victoria Harbour seen?", "Has the Victoria Harbour seen?"),
    q("You have to finish the rice", "The rice has to be finished", "The rice had to be finished", "The rice must be finished"),
    q("Fill in: It ___ be done.", "can", "is", "are"),
    q("Fill in: The rules must be ___.", "followed", "follow", "following"),
];

/// Difficulty tier shown on the HUD (1-3)
pub fn difficulty_tier(score: u64) -> u8 {
    if score > TIER_3_SCORE {
        3
    } else if score > TIER_2_SCORE {
        2
    } else {
        1
    }
}

/// Question pool for the current score and mode
pub fn pool_for(score: u64, mode: GameMode) -> Vec<Question> {
    if mode == GameMode::Challenge && score > CHALLENGE_MIX_SCORE {
        return [TIER_1, TIER_2, TIER_3].concat();
    }
    match difficulty_tier(score) {
        1 => TIER_1.to_vec(),
        2 => [TIER_1, TIER_2].concat(),
        _ => [TIER_2, TIER_3].concat(),
    }
}

/// Pick the next question, recording it in `used`.
///
/// When every question in the pool has been used, the history is cleared
/// and the whole pool becomes available again.
pub fn select_next<R: Rng>(score: u64, mode: GameMode, used: &mut Vec<String>, rng: &mut R) -> Question {
    let pool = pool_for(score, mode);

    let mut candidates: Vec<Question> = pool
        .iter()
        .filter(|q| !used.iter().any(|u| u == q.active))
        .copied()
        .collect();

    if candidates.is_empty() {
        log::warn!("Question pool exhausted ({} questions), resetting history", pool.len());
        used.clear();
        candidates = pool;
    }

    let question = candidates[rng.random_range(0..candidates.len())];
    used.push(question.active.to_string());
    question
}

/// Correct answer plus both distractors, shuffled
pub fn shuffled_options<R: Rng>(question: &Question, rng: &mut R) -> Vec<AnswerOption> {
    let mut options = vec![
        AnswerOption {
            text: question.passive.to_string(),
            is_correct: true,
        },
        AnswerOption {
            text: question.distractors[0].to_string(),
            is_correct: false,
        },
        AnswerOption {
            text: question.distractors[1].to_string(),
            is_correct: false,
        },
    ];
    options.shuffle(rng);
    debug_assert_eq!(options.iter().filter(|o| o.is_correct).count(), 1);
    options
}
