pub mod interaction_scorer;
