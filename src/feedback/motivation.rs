//! Motivational phrases shown when a countdown starts

use rand::seq::SliceRandom;
use rand::Rng;

pub const PHRASES: &[&str] = &[
    "Believe in yourself, anything is possible.",
    "Don't watch the clock; do what it does - keep going.",
    "Success is not final, failure is not fatal: it's the courage to continue that counts.",
    "You are stronger than you think, braver than you feel, and smarter than you know.",
    "Every step forward is a step closer to your dream.",
    "Don't give up - you never know what tomorrow will bring.",
    "The only way to do great work is to love what you do.",
    "You are capable of amazing things, just trust yourself.",
    "Push through the hard times; they're preparing you for better days.",
    "Every accomplishment starts with a single step.",
    "You are one decision away from a totally different life.",
    "Don't be afraid to take risks - that's where the magic happens.",
    "The biggest risk is not taking any risk at all.",
    "Your only limit is your own mind.",
    "Keep going, even when you don't feel like it.",
    "You are stronger than your excuses.",
    "Believe in yourself and you'll be unstoppable.",
    "Don't compare yourself to others; compare yourself to who you were yesterday.",
    "The best way to get started is to quit talking and begin doing.",
    "Success is a journey, not a destination.",
    "You are capable of achieving anything you set your mind to.",
    "Keep pushing forward, even when it feels like nothing is happening.",
    "Your thoughts have the power to shape your reality.",
    "You are one step away from changing everything.",
    "The biggest mistake is giving up on your dreams.",
    "Take control of your life and make today count.",
    "Don't let fear hold you back - face it head-on.",
    "Success is not about being perfect; it's about being persistent.",
    "Keep going, even when it feels like giving up is the easy way out.",
    "Your mindset determines your outcome.",
    "Don't be afraid to ask for help - that's what friends are for.",
    "The only thing holding you back is your own self-doubt.",
    "Take action today; don't put it off until tomorrow.",
    "Keep pushing forward, even when the road gets rough.",
    "Believe in yourself and your abilities.",
    "You got this!",
];

/// Pick a phrase using `rng`
pub fn phrase_with<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PHRASES.choose(rng).copied().unwrap_or("You got this!")
}

/// Pick a random phrase
pub fn random_phrase() -> &'static str {
    phrase_with(&mut rand::thread_rng())
}
