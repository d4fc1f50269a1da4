//! # QCGen Core
//!
//! Gate vocabulary, instruction normalization, and circuit assembly for the
//! Quantum Circuit Generator.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcgen_core // L0-L4: Foundation → Intent
//!     L0_Foundation // 기반 타입/상수/에러
//!         CoreTypes // 인덱스, 비트열, 조건
//!         Constants // 큐비트 상한, 기본 명령
//!         Errors // QcgenError, SkipReason
//!     L1_Circuit // 회로 구조
//!         Gate // GateKind 어휘 + Gate enum
//!         Circuit // 회로 구조체
//!         InstructionBuilder // 빌더 패턴
//!     L2_Normalize // 명령 정규화
//!         AngleEvaluator // 각도 식 평가
//!         InstructionNormalizer // 표면 문법 → 정규 명령
//!     L3_Assemble // 회로 조립
//!         GateDispatch // GateKind → Gate
//!         CircuitAssembler // 세션, 측정 추가, 건너뜀 보고
//!     L4_Intent // 요청 모델
//!         CircuitIntent // 종류 + 파라미터 + 설명
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcgen_core::prelude::*;
//!
//! let assembly = CircuitAssembler::new().assemble(None, &["h 0", "rx(pi/2) 1", "cx 0 1"]);
//!
//! assert_eq!(assembly.circuit.num_qubits(), 2);
//! assert!(assembly.measurements_appended);
//! assert_eq!(assembly.canonical_strings()[1], "rx 1 1.5707963267948966");
//! println!("{}", assembly.circuit.to_qasm());
//! ```
//!
//! ## Skipped Instructions
//!
//! ```rust
//! use qcgen_core::prelude::*;
//!
//! let assembly = CircuitAssembler::new().assemble(Some(2), &["h 0", "teleport 1", "cx 0 5"]);
//!
//! assert_eq!(assembly.skipped.len(), 2);
//! assert_eq!(assembly.skipped[0].reason, SkipReason::UnknownGate("teleport".into()));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Gate vocabulary (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Instruction builder (Gantree: L1_Circuit → InstructionBuilder)
pub mod builder;

/// Angle expressions (Gantree: L2_Normalize → AngleEvaluator)
pub mod angle;

/// Instruction normalizer (Gantree: L2_Normalize → InstructionNormalizer)
pub mod normalize;

/// Gate dispatch (Gantree: L3_Assemble → GateDispatch)
pub mod dispatch;

/// Circuit assembler (Gantree: L3_Assemble → CircuitAssembler)
pub mod assembler;

/// Circuit intents (Gantree: L4_Intent → CircuitIntent)
pub mod intent;

// ============================================================================
// Re-exports
// ============================================================================

pub use angle::{evaluate_angle, try_evaluate_angle, AngleError};
pub use assembler::{infer_num_qubits, Assembly, AssemblySession, CircuitAssembler, SkippedInstruction};
pub use builder::InstructionBuilder;
pub use circuit::Circuit;
pub use constants::{assembly, limits};
pub use error::{QcgenError, QcgenResult, SkipReason};
pub use gate::{Gate, GateKind};
pub use intent::{CircuitIntent, CircuitType, Explanation, GateNote, IntentParams};
pub use normalize::{normalize, prepare_suggested, CanonicalInstruction};
pub use types::{Angle, Bitstring, ClbitId, Condition, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qcgen_core::prelude::*;
    //! ```

    pub use crate::angle::{evaluate_angle, try_evaluate_angle, AngleError};
    pub use crate::assembler::{Assembly, AssemblySession, CircuitAssembler, SkippedInstruction};
    pub use crate::builder::InstructionBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{assembly, limits};
    pub use crate::error::{QcgenError, QcgenResult, SkipReason};
    pub use crate::gate::{Gate, GateKind};
    pub use crate::intent::{CircuitIntent, CircuitType, Explanation, IntentParams};
    pub use crate::normalize::{normalize, prepare_suggested, CanonicalInstruction};
    pub use crate::types::{Angle, Bitstring, ClbitId, Condition, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
