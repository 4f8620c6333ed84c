use serde::{Deserialize, Serialize};

/// An entry of one of the registry's directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: i64,
    pub entity: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Directory names as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceEntity {
    MachineModel,
    EngineModel,
    TransmissionModel,
    DriveAxleModel,
    SteerAxleModel,
    MaintenanceKind,
    FailureNode,
    RecoveryMethod,
}

impl ReferenceEntity {
    pub const ALL: [ReferenceEntity; 8] = [
        ReferenceEntity::MachineModel,
        ReferenceEntity::EngineModel,
        ReferenceEntity::TransmissionModel,
        ReferenceEntity::DriveAxleModel,
        ReferenceEntity::SteerAxleModel,
        ReferenceEntity::MaintenanceKind,
        ReferenceEntity::FailureNode,
        ReferenceEntity::RecoveryMethod,
    ];

    /// The `entity` value the backend filters on
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceEntity::MachineModel => "Модель техники",
            ReferenceEntity::EngineModel => "Модель двигателя",
            ReferenceEntity::TransmissionModel => "Модель трансмиссии",
            ReferenceEntity::DriveAxleModel => "Модель ведущего моста",
            ReferenceEntity::SteerAxleModel => "Модель управляемого моста",
            ReferenceEntity::MaintenanceKind => "Вид ТО",
            ReferenceEntity::FailureNode => "Узел отказа",
            ReferenceEntity::RecoveryMethod => "Способ восстановления",
        }
    }

    /// Short ASCII alias for command lines
    pub fn alias(&self) -> &'static str {
        match self {
            ReferenceEntity::MachineModel => "machine-model",
            ReferenceEntity::EngineModel => "engine-model",
            ReferenceEntity::TransmissionModel => "transmission-model",
            ReferenceEntity::DriveAxleModel => "drive-axle-model",
            ReferenceEntity::SteerAxleModel => "steer-axle-model",
            ReferenceEntity::MaintenanceKind => "maintenance-kind",
            ReferenceEntity::FailureNode => "failure-node",
            ReferenceEntity::RecoveryMethod => "recovery-method",
        }
    }

    /// Resolve an alias or the backend name itself
    pub fn parse(s: &str) -> Option<ReferenceEntity> {
        let s = s.trim();
        ReferenceEntity::ALL
            .into_iter()
            .find(|e| e.alias() == s || e.as_str() == s)
    }
}
