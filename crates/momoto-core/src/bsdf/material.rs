//! Static dispatch over every surface model.

use crate::error::OpticsError;
use crate::types::{BsdfContext, MaterialResponse, Vec3};

use super::{
    AnisotropicGgx, Bsdf, Conductor, Dielectric, NeuralCorrected, Subsurface, Temporal, ThinFilm,
};

/// Any surface material the engine can evaluate.
#[derive(Debug, Clone)]
pub enum Material {
    Dielectric(Dielectric),
    Conductor(Conductor),
    AnisotropicGgx(AnisotropicGgx),
    Subsurface(Subsurface),
    ThinFilm(ThinFilm),
    NeuralCorrected(Box<NeuralCorrected<Material>>),
    Temporal(Box<Temporal<Material>>),
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            Material::Dielectric($m) => $body,
            Material::Conductor($m) => $body,
            Material::AnisotropicGgx($m) => $body,
            Material::Subsurface($m) => $body,
            Material::ThinFilm($m) => $body,
            Material::NeuralCorrected($m) => $body,
            Material::Temporal($m) => $body,
        }
    };
}

impl Material {
    /// Short variant name, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Material::Dielectric(_) => "dielectric",
            Material::Conductor(_) => "conductor",
            Material::AnisotropicGgx(_) => "anisotropic_ggx",
            Material::Subsurface(_) => "subsurface",
            Material::ThinFilm(_) => "thin_film",
            Material::NeuralCorrected(_) => "neural_corrected",
            Material::Temporal(_) => "temporal",
        }
    }

    /// The model with any neural or temporal wrappers removed.
    pub fn physical(&self) -> &Material {
        match self {
            Material::NeuralCorrected(n) => n.inner().physical(),
            Material::Temporal(t) => t.inner().physical(),
            other => other,
        }
    }
}

impl Bsdf for Material {
    fn name(&self) -> &str {
        dispatch!(self, m => m.name())
    }

    fn evaluate_at(
        &self,
        ctx: &BsdfContext,
        wavelength_nm: f64,
    ) -> Result<MaterialResponse, OpticsError> {
        dispatch!(self, m => m.evaluate_at(ctx, wavelength_nm))
    }

    fn evaluate_f_at(&self, wi: &Vec3, wo: &Vec3, wavelength_nm: f64) -> f64 {
        dispatch!(self, m => m.evaluate_f_at(wi, wo, wavelength_nm))
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

impl From<Conductor> for Material {
    fn from(m: Conductor) -> Self {
        Material::Conductor(m)
    }
}

impl From<AnisotropicGgx> for Material {
    fn from(m: AnisotropicGgx) -> Self {
        Material::AnisotropicGgx(m)
    }
}

impl From<Subsurface> for Material {
    fn from(m: Subsurface) -> Self {
        Material::Subsurface(m)
    }
}

impl From<ThinFilm> for Material {
    fn from(m: ThinFilm) -> Self {
        Material::ThinFilm(m)
    }
}

impl From<NeuralCorrected<Material>> for Material {
    fn from(m: NeuralCorrected<Material>) -> Self {
        Material::NeuralCorrected(Box::new(m))
    }
}

impl From<Temporal<Material>> for Material {
    fn from(m: Temporal<Material>) -> Self {
        Material::Temporal(Box::new(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsdf::SirenConfig;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_dispatch_matches_concrete_type() {
        let ctx = BsdfContext::at_incidence(30.0, 600.0).unwrap();
        let gold = Conductor::gold();
        let material = Material::from(gold.clone());
        assert_eq!(material.kind(), "conductor");
        assert_eq!(material.name(), gold.name());
        assert_eq!(material.evaluate(&ctx).unwrap(), gold.evaluate(&ctx).unwrap());
    }

    #[test]
    fn test_wrappers_nest() {
        let neural = NeuralCorrected::with_config(
            Material::from(Subsurface::skin()),
            &SirenConfig::default(),
            0.1,
        )
        .unwrap();
        let temporal = Temporal::new(Material::from(neural), 0.05).unwrap();
        let material = Material::from(temporal);
        assert_eq!(material.kind(), "temporal");
        assert_eq!(material.physical().kind(), "subsurface");

        let r = material.evaluate(&BsdfContext::at_incidence(0.0, 550.0).unwrap()).unwrap();
        assert_abs_diff_eq!(r.total(), 1.0, epsilon = 1e-12);
    }
}
