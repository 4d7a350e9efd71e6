//! Host-side control for a four servo robotic arm (rotating base, gripper
//! and two arm joints) that can be driven three ways: by tracking a hand in
//! front of a camera, by recognising a handful of hand gestures, or by
//! voice commands.
//!
//! Every method is a [`Modality`](modality::Modality). A
//! [`Session`](session::Session) builds a fresh one when it starts and hands
//! it to a [worker](worker) together with its input source and the serial
//! [transport](transport). Each input (one video frame's detections, or one
//! classified utterance) becomes at most one [`ArmPose`](pose::ArmPose),
//! written to the arm's controller as a four byte packet, plus a status
//! report for whoever is watching.
//!
//! The detection model, camera capture and speech classifier live outside
//! this crate; their output is fed in as [`Frame`](detection::Frame)s and
//! labels, either recorded ([replay]), simulated ([dummy_detector]) or piped
//! in on stdin.

#![warn(missing_docs)]
pub mod args;
pub mod config;
pub mod detection;
pub mod direction;
pub mod dummy_detector;
pub mod geometry;
pub mod gui;
pub mod mapper;
pub mod modality;
pub mod pose;
pub mod position_graph;
pub mod replay;
pub mod session;
pub mod transport;
pub mod worker;
