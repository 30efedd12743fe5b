//! Geometry probe - "что первым на линии удара?"
//!
//! Core не владеет физикой. Движок предоставляет реализацию `GeometryProbe`
//! (raycast по своим collider'ам) и кладёт её в `HitProbe` resource.
//! Headless режим использует `VolumeProbe`: ray vs sphere по HitVolume/Obstacle.

use bevy::prelude::*;

/// Тип collider'а, в который попал луч
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderTag {
    Actor,
    Obstacle,
}

/// Фильтр слоёв для raycast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeMask {
    pub actors: bool,
    pub obstacles: bool,
}

impl ProbeMask {
    /// Удары: актёры + препятствия (стена закрывает цель)
    pub const STRIKE: ProbeMask = ProbeMask {
        actors: true,
        obstacles: true,
    };

    pub fn admits(&self, tag: ColliderTag) -> bool {
        match tag {
            ColliderTag::Actor => self.actors,
            ColliderTag::Obstacle => self.obstacles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    pub point: Vec3,
    pub distance: f32,
    pub entity: Entity,
    pub tag: ColliderTag,
}

/// Сфера для headless probe (снимок позиции на момент резолва)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeVolume {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub tag: ColliderTag,
}

/// Raycast backend (движок или headless)
///
/// Луч, стартующий внутри collider'а, этот collider не видит
/// (атакующий не попадает сам в себя).
pub trait GeometryProbe: Send + Sync {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ProbeMask,
    ) -> Option<ProbeHit>;

    /// Обновить снимок volumes перед резолвом (движок может игнорировать)
    fn sync_volumes(&mut self, _volumes: &[ProbeVolume]) {}
}

/// Resource: активный probe backend
///
/// `None` → удары не резолвятся (warning в лог), бой не падает.
#[derive(Resource, Default)]
pub struct HitProbe {
    backend: Option<Box<dyn GeometryProbe>>,
}

impl HitProbe {
    pub fn new(backend: Box<dyn GeometryProbe>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn headless() -> Self {
        Self::new(Box::new(VolumeProbe::default()))
    }

    pub fn set_backend(&mut self, backend: Box<dyn GeometryProbe>) {
        self.backend = Some(backend);
    }

    pub fn backend(&self) -> Option<&dyn GeometryProbe> {
        self.backend.as_deref()
    }

    pub fn backend_mut(&mut self) -> Option<&mut (dyn GeometryProbe + 'static)> {
        self.backend.as_deref_mut()
    }
}

/// Headless probe: ray vs spheres
#[derive(Debug, Clone, Default)]
pub struct VolumeProbe {
    volumes: Vec<ProbeVolume>,
}

impl VolumeProbe {
    pub fn with_volumes(volumes: Vec<ProbeVolume>) -> Self {
        Self { volumes }
    }
}

impl GeometryProbe for VolumeProbe {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: ProbeMask,
    ) -> Option<ProbeHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO || !(max_distance > 0.0) {
            return None;
        }

        let mut best: Option<ProbeHit> = None;
        for volume in &self.volumes {
            if !mask.admits(volume.tag) {
                continue;
            }
            let Some(distance) = ray_sphere(origin, dir, volume.center, volume.radius) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            // Строго меньше: при равенстве побеждает volume, синхронизированный раньше
            if best.is_none_or(|hit| distance < hit.distance) {
                best = Some(ProbeHit {
                    point: origin + dir * distance,
                    distance,
                    entity: volume.entity,
                    tag: volume.tag,
                });
            }
        }
        best
    }

    fn sync_volumes(&mut self, volumes: &[ProbeVolume]) {
        self.volumes.clear();
        self.volumes.extend_from_slice(volumes);
    }
}

/// Расстояние до первого пересечения луча (dir нормализован) со сферой.
/// Origin внутри сферы → None.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = offset.dot(dir);
    if b > 0.0 {
        // Сфера позади луча
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}
