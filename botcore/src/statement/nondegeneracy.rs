//! Side conditions making the algebraic description sound.
//!
//! Some construction steps describe more than one configuration
//! algebraically: a point on a segment is a point on its line, a regular
//! polygon is either of two mirror images. The injectors below add the
//! inequality selecting the intended configuration. They are only read by
//! the real geometry path.
use botpoly::{
    Polynomial, VariablePool,
    geometry::{self, Coords},
};
use log::{debug, info};

use crate::{
    backend::CasEvaluator,
    construction::{
        ObjectId, ObjectKind, StepKind,
        encoder::{Encoding, EncodingScope},
    },
    magic::CAS_FAILURE,
    ndg::{NdgCondition, names},
    statement::{AlgebraicStatement, Owner},
    utils::error::BotResult,
};

/// The object being collected, with its step and encoding.
pub struct InjectionSite<'a> {
    pub object: ObjectId,
    pub step: &'a StepKind,
    pub encoding: &'a Encoding,
    pub scope: &'a EncodingScope<'a>,
    pub cas: &'a dyn CasEvaluator,
}

impl InjectionSite<'_> {
    fn own_point(&self, index: usize) -> BotResult<Coords> {
        self.encoding
            .coords(index)
            .ok_or_else(|| self.scope.unsupported(self.object))
    }
}

pub type Injector = fn(&mut AlgebraicStatement, &InjectionSite<'_>) -> BotResult<()>;

/// Side condition handler of a step kind.
pub fn injector_for(step: &StepKind) -> Option<Injector> {
    match step {
        StepKind::PointOnPath { .. } => Some(point_on_segment),
        StepKind::IncircleCenter { .. } => Some(incircle_center),
        StepKind::PointInRegion { .. } => Some(point_in_triangle),
        StepKind::AngularBisector { .. } => Some(angular_bisector),
        StepKind::RegularPolygon { .. } => Some(regular_polygon),
        _ => None,
    }
}

/// `(a1-p1)*(p1-b1)+(a2-p2)*(p2-b2)>=0` for `p` on segment `ab`.
fn point_on_segment(st: &mut AlgebraicStatement, site: &InjectionSite<'_>) -> BotResult<()> {
    let StepKind::PointOnPath { path } = site.step else {
        return Ok(());
    };
    if site.scope.kind(*path)? != ObjectKind::Segment {
        return Ok(());
    }
    let [a, b] = site.scope.line(*path)?;
    let p = site.own_point(0)?;
    let var = Polynomial::var;
    let lhs = &(&(var(a[0]) - var(p[0])) * &(var(p[0]) - var(b[0])))
        + &(&(var(a[1]) - var(p[1])) * &(var(p[1]) - var(b[1])));
    st.add_inequality(format!("{}>=0", lhs));
    Ok(())
}

/// `p` strictly inside the triangle `abc`: the three triplet signs agree.
fn inside_triangle(p: Coords, a: Coords, b: Coords, c: Coords) -> String {
    let d1 = geometry::triplet_sign(p, a, b);
    let d2 = geometry::triplet_sign(p, b, c);
    let d3 = geometry::triplet_sign(p, c, a);
    let all = |op: &str| format!("(({d1}{op}0)AND({d2}{op}0)AND({d3}{op}0))");
    format!("{}OR{}", all(">"), all("<"))
}

fn incircle_center(st: &mut AlgebraicStatement, site: &InjectionSite<'_>) -> BotResult<()> {
    let StepKind::IncircleCenter { a, b, c } = site.step else {
        return Ok(());
    };
    let scope = site.scope;
    let condition = inside_triangle(
        site.own_point(0)?,
        scope.point(*a)?,
        scope.point(*b)?,
        scope.point(*c)?,
    );
    st.add_inequality(condition);
    Ok(())
}

fn point_in_triangle(st: &mut AlgebraicStatement, site: &InjectionSite<'_>) -> BotResult<()> {
    let StepKind::PointInRegion { region } = site.step else {
        return Ok(());
    };
    if site.scope.kind(*region)? != ObjectKind::Polygon {
        return Ok(());
    }
    let vertices = site.scope.vertices(*region)?;
    if let [a, b, c] = vertices[..] {
        st.add_inequality(inside_triangle(site.own_point(0)?, a, b, c));
    }
    Ok(())
}

/// The helper point of the bisector of `abc` lies inside the angle.
fn angular_bisector(st: &mut AlgebraicStatement, site: &InjectionSite<'_>) -> BotResult<()> {
    let StepKind::AngularBisector { a, b, c } = site.step else {
        return Ok(());
    };
    let scope = site.scope;
    let (a, b, c) = (scope.point(*a)?, scope.point(*b)?, scope.point(*c)?);
    let m = site.own_point(0)?;
    let product = &geometry::triplet_sign(a, b, m) * &geometry::triplet_sign(b, c, m);
    st.add_inequality(format!("{}>0", product));
    Ok(())
}

/// Triplet sign of `a`, `b`, `c` with `a` replaced by its quarter turn around `b`.
fn triplet_sign_rotated(a: Coords, b: Coords, c: Coords) -> Polynomial {
    let var = Polynomial::var;
    let rotated = [
        &(var(b[0]) + var(a[1])) - &var(b[1]),
        &(var(b[1]) + var(b[0])) - &var(a[0]),
    ];
    &(&(&rotated[0] - &var(c[0])) * &(var(b[1]) - var(c[1])))
        - &(&(var(b[0]) - var(c[0])) * &(&rotated[1] - &var(c[1])))
}

/// Orientation of a regular polygon, read on its third vertex.
fn regular_polygon(st: &mut AlgebraicStatement, site: &InjectionSite<'_>) -> BotResult<()> {
    let StepKind::RegularPolygon { a, b, n } = site.step else {
        return Ok(());
    };
    let (a, b) = (site.scope.point(*a)?, site.scope.point(*b)?);
    let c = site.own_point(2)?;
    if *n != 4 {
        st.add_inequality(format!("{}>0", geometry::triplet_sign(a, b, c)));
    }
    if *n > 4 && *n < 9 {
        st.add_inequality(format!("{}>0", triplet_sign_rotated(a, b, c)));
    } else if *n >= 9 {
        // The mean of the two largest roots of the rotation polynomial
        // separates the largest one.
        let Some(rotation) = site.encoding.polynomials.first() else {
            return Ok(());
        };
        let program = format!(
            "[[p:={}],[s:=solve(p=0)],[s1:=s[-2][2]],[s2:=s[-1][2]],\
             [lvar(p)[0]>simplify(floor((s1+s2)/2*1000)/1000)]][4][0]",
            rotation
        );
        match site.cas.evaluate(&program) {
            Ok(bound) if !bound.contains(CAS_FAILURE) => {
                st.add_inequality(bound);
            }
            Ok(_) => debug!("No bound for the vertex coordinate"),
            Err(e) => debug!("Error computing bound for vertex coordinate: {}", e),
        }
    }
    Ok(())
}

/// Forbid every triplet of free points from being collinear.
///
/// Adds `collinear(P,Q,R)*t-1` with a fresh `t` for every unordered triplet
/// and records the matching NDG candidate. Returns the number of polynomials
/// added.
pub fn free_points_never_collinear(st: &mut AlgebraicStatement, pool: &VariablePool) -> usize {
    let points = st.free_points.clone();
    if points.len() < 3 {
        return 0;
    }
    let mut labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
    labels.sort();
    let name = if points.len() > 3 {
        names::DEGENERATE_POLYGON
    } else {
        names::ARE_COLLINEAR
    };
    st.add_ndg_candidate(NdgCondition::new(name, labels));

    let mut added = 0;
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            for k in j + 1..points.len() {
                let (p, q, r) = (&points[i], &points[j], &points[k]);
                info!(
                    "Forcing non-collinearity for points {}, {} and {}",
                    p.label, q.label, r.label
                );
                let collinear = geometry::collinear(p.coords, q.coords, r.coords);
                if st.add_polynomial(
                    Owner::Condition,
                    geometry::rabinowitsch(&collinear, pool.fresh()),
                ) {
                    added += 1;
                }
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use botpoly::Variable;

    use super::*;

    const P: Coords = [Variable(1), Variable(2)];
    const A: Coords = [Variable(3), Variable(4)];
    const B: Coords = [Variable(5), Variable(6)];
    const C: Coords = [Variable(7), Variable(8)];

    #[test]
    fn triangle_condition_shape() {
        let condition = inside_triangle(P, A, B, C);
        let d1 = geometry::triplet_sign(P, A, B).to_string();
        assert!(condition.starts_with(&format!("(({}>0)AND(", d1)));
        assert_eq!(condition.matches("AND").count(), 4);
        assert_eq!(condition.matches(")OR(").count(), 1);
    }

    #[test]
    fn dispatch_covers_the_orientation_sensitive_steps() {
        let id = ObjectId(1);
        assert!(injector_for(&StepKind::PointOnPath { path: id }).is_some());
        assert!(injector_for(&StepKind::RegularPolygon { a: id, b: id, n: 5 }).is_some());
        assert!(injector_for(&StepKind::Midpoint { a: id, b: id }).is_none());
        assert!(injector_for(&StepKind::FixedSlopeLine).is_none());
    }

    #[test]
    fn rotated_sign_of_a_counterclockwise_triangle() {
        // a = (0,0), b = (1,0), c = (2,1): the rotated point is (1,1)
        let values = [(A, (0, 0)), (B, (1, 0)), (C, (2, 1))]
            .iter()
            .flat_map(|(p, (x, y))| [(p[0], (*x).into()), (p[1], (*y).into())])
            .collect();
        let sign = triplet_sign_rotated(A, B, C).substitute_values(&values);
        // (1-2)*(0-1) - (1-2)*(1-1)
        assert_eq!(sign, Polynomial::constant(1));
    }
}
